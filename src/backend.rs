//! Pluggable numeric capabilities (root finding, residues, time simulation).
//!
//! Analyzers never call a concrete algorithm directly; they go through a
//! [`NumericBackend`], so a backend can be swapped for a known-answer fixture in tests.

use std::fmt;

use crate::errors::AnalysisError;
use crate::math::{CScalar, Scalar};
use crate::polynomial::{CompanionRoots, Polynomial};
use crate::residue::{GeneralizedResidues, PartialFractions};
use crate::simulation::{
    Discretization, Excitation, SimulationError, StateSpaceSimulator, TimeResponse,
};
use crate::transfer::TransferFunction;

/// Computes the complex roots of a real polynomial.
pub trait RootFinder {
    /// Returns every root (with repetition), conjugate pairs adjacent.
    /// Constant and zero polynomials have no roots.
    fn roots(&self, poly: &Polynomial) -> Vec<CScalar>;
}

/// Computes the partial-fraction expansion of a transfer function.
pub trait ResidueSolver {
    /// Decomposes `tf` given the roots of its denominator.
    fn decompose(
        &self,
        tf: &TransferFunction,
        poles: &[CScalar],
    ) -> Result<PartialFractions, AnalysisError>;
}

/// Simulates the time-domain response of a transfer function.
pub trait ResponseSimulator {
    /// Samples the response to `excitation` at each instant in `times`.
    fn simulate(
        &self,
        tf: &TransferFunction,
        excitation: Excitation,
        times: &[Scalar],
        method: Discretization,
    ) -> Result<TimeResponse, SimulationError>;
}

/// Bundle of numeric capabilities used by [`SystemAnalysis`](crate::analysis::SystemAnalysis).
pub struct NumericBackend {
    roots: Box<dyn RootFinder + Send + Sync>,
    residues: Box<dyn ResidueSolver + Send + Sync>,
    simulator: Box<dyn ResponseSimulator + Send + Sync>,
}

impl NumericBackend {
    /// Creates a backend from explicit implementations.
    #[must_use]
    pub fn new<R, P, S>(roots: R, residues: P, simulator: S) -> Self
    where
        R: RootFinder + Send + Sync + 'static,
        P: ResidueSolver + Send + Sync + 'static,
        S: ResponseSimulator + Send + Sync + 'static,
    {
        Self {
            roots: Box::new(roots),
            residues: Box::new(residues),
            simulator: Box::new(simulator),
        }
    }

    /// Replaces the root finder.
    #[must_use]
    pub fn with_root_finder<R>(mut self, roots: R) -> Self
    where
        R: RootFinder + Send + Sync + 'static,
    {
        self.roots = Box::new(roots);
        self
    }

    /// Replaces the residue solver.
    #[must_use]
    pub fn with_residue_solver<P>(mut self, residues: P) -> Self
    where
        P: ResidueSolver + Send + Sync + 'static,
    {
        self.residues = Box::new(residues);
        self
    }

    /// Replaces the response simulator.
    #[must_use]
    pub fn with_simulator<S>(mut self, simulator: S) -> Self
    where
        S: ResponseSimulator + Send + Sync + 'static,
    {
        self.simulator = Box::new(simulator);
        self
    }

    /// Active root finder.
    #[must_use]
    pub fn root_finder(&self) -> &(dyn RootFinder + Send + Sync) {
        self.roots.as_ref()
    }

    /// Active residue solver.
    #[must_use]
    pub fn residue_solver(&self) -> &(dyn ResidueSolver + Send + Sync) {
        self.residues.as_ref()
    }

    /// Active response simulator.
    #[must_use]
    pub fn simulator(&self) -> &(dyn ResponseSimulator + Send + Sync) {
        self.simulator.as_ref()
    }
}

impl Default for NumericBackend {
    fn default() -> Self {
        Self::new(CompanionRoots, GeneralizedResidues::default(), StateSpaceSimulator)
    }
}

impl fmt::Debug for NumericBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericBackend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::analysis::{AnalysisConfig, SystemAnalysis};
    use crate::grid::linspace;
    use crate::math::real;
    use crate::residue::ResidueTerm;
    use crate::systems::MechanicalSystem;

    /// Known answer for `1 / (s + 1)`, regardless of the system passed in.
    struct FirstOrderResidues;

    impl ResidueSolver for FirstOrderResidues {
        fn decompose(
            &self,
            _tf: &TransferFunction,
            _poles: &[CScalar],
        ) -> Result<PartialFractions, AnalysisError> {
            let term = ResidueTerm {
                residue: real(1.0),
                pole: real(-1.0),
                power: 1,
            };
            Ok(PartialFractions::new(vec![term], Vec::new()))
        }
    }

    struct FirstOrderResponse;

    impl ResponseSimulator for FirstOrderResponse {
        fn simulate(
            &self,
            _tf: &TransferFunction,
            excitation: Excitation,
            times: &[Scalar],
            _method: Discretization,
        ) -> Result<TimeResponse, SimulationError> {
            let values = times
                .iter()
                .map(|t| match excitation {
                    Excitation::Impulse => (-t).exp(),
                    Excitation::Step => 1.0 - (-t).exp(),
                })
                .collect();
            Ok(TimeResponse {
                times: times.to_vec(),
                values,
            })
        }
    }

    struct BrokenSimulator;

    impl ResponseSimulator for BrokenSimulator {
        fn simulate(
            &self,
            _tf: &TransferFunction,
            _excitation: Excitation,
            _times: &[Scalar],
            _method: Discretization,
        ) -> Result<TimeResponse, SimulationError> {
            Err(SimulationError::SolveFailed("singular step matrix".into()))
        }
    }

    fn first_order_backend() -> NumericBackend {
        NumericBackend::default()
            .with_residue_solver(FirstOrderResidues)
            .with_simulator(FirstOrderResponse)
    }

    #[test]
    fn injected_residue_solver_and_simulator_are_used() {
        let analysis = SystemAnalysis::with_backend(
            MechanicalSystem::reference(),
            AnalysisConfig::default(),
            first_order_backend(),
        )
        .unwrap();

        let fractions = analysis.partial_fractions();
        assert_eq!(fractions.len(), 1);
        assert_eq!(fractions.poles(), vec![real(-1.0)]);
        // Roots still come from the default companion-matrix finder.
        assert_eq!(analysis.poles().len(), 2);

        let times = linspace(0.0, 5.0, 51);
        let step = analysis.step_response_at(&times).unwrap();
        assert_relative_eq!(step.values[10], 1.0 - (-1.0_f64).exp(), epsilon = 1.0e-12);
        let err = analysis.impulse_reconstruction_error(&times).unwrap();
        assert!(err < 1.0e-12, "fixture mismatch {err}");
    }

    #[test]
    fn simulator_failures_surface_as_analysis_errors() {
        let backend = NumericBackend::default().with_simulator(BrokenSimulator);
        let analysis = SystemAnalysis::with_backend(
            MechanicalSystem::reference(),
            AnalysisConfig::default(),
            backend,
        )
        .unwrap();
        let err = analysis.impulse_response().unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Simulation(SimulationError::SolveFailed(_))
        ));
    }
}
