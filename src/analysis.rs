//! Shared transfer-function analysis pipeline.
//!
//! [`SystemAnalysis`] derives everything that does not depend on a time grid
//! (transfer function, poles, zeros, partial fractions) once at construction, and
//! computes time-domain data on demand without mutating itself.

use std::fmt;
use std::io;
use std::io::Write;

use crate::backend::NumericBackend;
use crate::errors::AnalysisError;
use crate::grid::{sample_map, TimeGrid};
use crate::math::{CScalar, Scalar};
use crate::residue::{PartialFractions, ResidueTerm};
use crate::simulation::{Discretization, Excitation, SimulationError, TimeResponse};
use crate::systems::PhysicalSystem;
use crate::transfer::TransferFunction;

/// Time grids and discretisation used by an analysis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisConfig {
    /// Grid for impulse and step responses.
    pub response_grid: TimeGrid,
    /// Grid for the partial-fraction component reconstruction.
    pub component_grid: TimeGrid,
    /// State update used by the simulator.
    pub method: Discretization,
}

impl AnalysisConfig {
    /// Creates a configuration with the default (zero-order hold) discretisation.
    #[must_use]
    pub fn new(response_grid: TimeGrid, component_grid: TimeGrid) -> Self {
        Self {
            response_grid,
            component_grid,
            method: Discretization::default(),
        }
    }

    /// Overrides the discretisation.
    #[must_use]
    pub fn with_method(mut self, method: Discretization) -> Self {
        self.method = method;
        self
    }

    /// Overrides both grids' span (`None` keeps each grid's own setting).
    #[must_use]
    pub fn with_span(mut self, span: Option<Scalar>) -> Self {
        if let Some(span) = span {
            self.response_grid.span = Some(span);
            self.component_grid.span = Some(span);
        }
        self
    }

    /// Overrides both grids' sample count (`None` keeps each grid's own setting).
    #[must_use]
    pub fn with_samples(mut self, samples: Option<usize>) -> Self {
        if let Some(samples) = samples {
            self.response_grid.samples = samples;
            self.component_grid.samples = samples;
        }
        self
    }

    /// Validates both grids.
    ///
    /// # Errors
    /// Propagates [`TimeGrid::validate`] failures.
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.response_grid.validate()?;
        self.component_grid.validate()
    }
}

/// Time-domain trace of one partial-fraction term.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTrace {
    /// Term the trace was generated from.
    pub term: ResidueTerm,
    /// Real part of the term's contribution at each instant.
    pub values: Vec<Scalar>,
}

/// Partial-fraction components and their sum on a common grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSeries {
    /// Sample instants in seconds.
    pub times: Vec<Scalar>,
    /// One trace per expansion term.
    pub components: Vec<ComponentTrace>,
    /// Pointwise sum of all components (the reconstructed impulse response).
    pub total: Vec<Scalar>,
}

impl ComponentSeries {
    /// Evaluates every term of `fractions` at `times`.
    #[must_use]
    pub fn evaluate(fractions: &PartialFractions, times: &[Scalar]) -> Self {
        let components: Vec<ComponentTrace> = fractions
            .terms()
            .iter()
            .map(|term| ComponentTrace {
                term: *term,
                values: sample_map(times.iter().copied(), |t| term.evaluate_real(t)),
            })
            .collect();
        let total = (0..times.len())
            .map(|i| components.iter().map(|c| c.values[i]).sum())
            .collect();
        Self {
            times: times.to_vec(),
            components,
            total,
        }
    }

    /// The reconstructed sum as a [`TimeResponse`].
    #[must_use]
    pub fn total_response(&self) -> TimeResponse {
        TimeResponse {
            times: self.times.clone(),
            values: self.total.clone(),
        }
    }
}

/// Writes components as CSV (`time,component_1,..,component_n,total`).
pub fn write_components_csv<W: Write>(mut w: W, series: &ComponentSeries) -> io::Result<()> {
    write!(w, "time")?;
    for i in 0..series.components.len() {
        write!(w, ",component_{}", i + 1)?;
    }
    writeln!(w, ",total")?;
    for (idx, time) in series.times.iter().enumerate() {
        write!(w, "{:.16e}", time)?;
        for component in &series.components {
            write!(w, ",{:.16e}", component.values[idx])?;
        }
        writeln!(w, ",{:.16e}", series.total[idx])?;
    }
    Ok(())
}

/// Transfer-function analysis of a physical system.
#[derive(Debug)]
pub struct SystemAnalysis<S> {
    system: S,
    config: AnalysisConfig,
    transfer: TransferFunction,
    poles: Vec<CScalar>,
    zeros: Vec<CScalar>,
    fractions: PartialFractions,
    backend: NumericBackend,
}

impl<S: PhysicalSystem> SystemAnalysis<S> {
    /// Analyzes `system` with its domain defaults.
    ///
    /// # Errors
    /// See [`SystemAnalysis::with_backend`].
    pub fn new(system: S) -> Result<Self, AnalysisError> {
        let config = system.default_config();
        Self::with_config(system, config)
    }

    /// Analyzes `system` with an explicit configuration and the default backend.
    ///
    /// # Errors
    /// See [`SystemAnalysis::with_backend`].
    pub fn with_config(system: S, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::with_backend(system, config, NumericBackend::default())
    }

    /// Analyzes `system` with explicit configuration and numeric backend.
    ///
    /// # Errors
    /// Returns [`AnalysisError::SingularSystem`] for a degenerate denominator and
    /// [`AnalysisError::Simulation`] for invalid grid settings.
    pub fn with_backend(
        system: S,
        config: AnalysisConfig,
        backend: NumericBackend,
    ) -> Result<Self, AnalysisError> {
        let _span = tracing::info_span!("system_analysis", system = system.name()).entered();
        config.validate()?;

        let transfer = system.transfer_function()?;
        let poles = backend.root_finder().roots(transfer.denominator());
        let zeros = backend.root_finder().roots(transfer.numerator());
        let fractions = backend.residue_solver().decompose(&transfer, &poles)?;
        tracing::debug!(%transfer, ?poles, ?zeros, terms = fractions.len(), "derived pole-zero structure");
        if fractions.has_repeated_poles() {
            tracing::info!("repeated poles found; expansion includes polynomial-in-t terms");
        }

        Ok(Self {
            system,
            config,
            transfer,
            poles,
            zeros,
            fractions,
            backend,
        })
    }

    /// Analyzed system.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Transfer function built from the system parameters.
    pub fn transfer_function(&self) -> &TransferFunction {
        &self.transfer
    }

    /// Roots of the denominator.
    pub fn poles(&self) -> &[CScalar] {
        &self.poles
    }

    /// Roots of the numerator (empty for a constant numerator).
    pub fn zeros(&self) -> &[CScalar] {
        &self.zeros
    }

    /// Partial-fraction expansion.
    pub fn partial_fractions(&self) -> &PartialFractions {
        &self.fractions
    }

    /// True when every pole lies strictly in the left half-plane.
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.re < 0.0)
    }

    /// Static gain `H(0)`, the step response's steady state for a stable system.
    pub fn dc_gain(&self) -> Option<Scalar> {
        self.transfer.dc_gain()
    }

    /// Instants of the response grid.
    ///
    /// # Errors
    /// Propagates grid validation failures.
    pub fn response_times(&self) -> Result<Vec<Scalar>, AnalysisError> {
        Ok(self.config.response_grid.resolve(&self.poles)?)
    }

    /// Instants of the component grid.
    ///
    /// # Errors
    /// Propagates grid validation failures.
    pub fn component_times(&self) -> Result<Vec<Scalar>, AnalysisError> {
        Ok(self.config.component_grid.resolve(&self.poles)?)
    }

    /// Impulse response on the response grid.
    ///
    /// # Errors
    /// Propagates simulator failures.
    pub fn impulse_response(&self) -> Result<TimeResponse, AnalysisError> {
        self.impulse_response_at(&self.response_times()?)
    }

    /// Impulse response at explicit instants.
    ///
    /// # Errors
    /// Propagates simulator failures.
    pub fn impulse_response_at(&self, times: &[Scalar]) -> Result<TimeResponse, AnalysisError> {
        self.simulate(Excitation::Impulse, times)
    }

    /// Unit-step response on the response grid.
    ///
    /// # Errors
    /// Propagates simulator failures.
    pub fn step_response(&self) -> Result<TimeResponse, AnalysisError> {
        self.step_response_at(&self.response_times()?)
    }

    /// Unit-step response at explicit instants.
    ///
    /// # Errors
    /// Propagates simulator failures.
    pub fn step_response_at(&self, times: &[Scalar]) -> Result<TimeResponse, AnalysisError> {
        self.simulate(Excitation::Step, times)
    }

    /// Partial-fraction components on the component grid.
    ///
    /// # Errors
    /// Propagates grid validation failures.
    pub fn partial_fraction_components(&self) -> Result<ComponentSeries, AnalysisError> {
        Ok(self.partial_fraction_components_at(&self.component_times()?))
    }

    /// Partial-fraction components at explicit instants.
    pub fn partial_fraction_components_at(&self, times: &[Scalar]) -> ComponentSeries {
        ComponentSeries::evaluate(&self.fractions, times)
    }

    /// Largest pointwise gap between the simulated impulse response and the
    /// partial-fraction reconstruction at `times`.
    ///
    /// # Errors
    /// Propagates simulator failures.
    pub fn impulse_reconstruction_error(&self, times: &[Scalar]) -> Result<Scalar, AnalysisError> {
        let simulated = self.impulse_response_at(times)?;
        Ok(simulated
            .points()
            .map(|(t, y)| (y - self.fractions.evaluate(t)).abs())
            .fold(0.0, Scalar::max))
    }

    fn simulate(&self, excitation: Excitation, times: &[Scalar]) -> Result<TimeResponse, AnalysisError> {
        Ok(self
            .backend
            .simulator()
            .simulate(&self.transfer, excitation, times, self.config.method)?)
    }
}

fn write_roots(f: &mut fmt::Formatter<'_>, label: &str, roots: &[CScalar]) -> fmt::Result {
    if roots.is_empty() {
        return writeln!(f, "{label}: none");
    }
    writeln!(f, "{label}:")?;
    for r in roots {
        writeln!(f, "  {:.6}", r)?;
    }
    Ok(())
}

impl<S: PhysicalSystem> fmt::Display for SystemAnalysis<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "System: {}", self.system.name())?;
        for parameter in self.system.parameters() {
            writeln!(f, "  {parameter}")?;
        }
        writeln!(f, "Transfer function:")?;
        writeln!(f, "  {}", self.transfer)?;
        write_roots(f, "Poles", &self.poles)?;
        write_roots(f, "Zeros", &self.zeros)?;
        writeln!(f, "Partial fractions:")?;
        for term in self.fractions.terms() {
            writeln!(f, "  {term}")?;
        }
        if !self.fractions.direct().is_empty() {
            writeln!(f, "  direct term: {:?}", self.fractions.direct())?;
        }
        writeln!(f, "Stable: {}", if self.is_stable() { "yes" } else { "no" })?;
        match self.dc_gain() {
            Some(gain) => write!(f, "DC gain: {gain}"),
            None => write!(f, "DC gain: unbounded"),
        }
    }
}
