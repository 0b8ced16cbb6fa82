//! Time-domain simulation of transfer functions through a state-space realization.

use nalgebra::{DMatrix, DVector};

use crate::backend::ResponseSimulator;
use crate::constants::STEP_REUSE_TOLERANCE;
use crate::math::Scalar;
use crate::transfer::TransferFunction;

/// Input signal applied to the system.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excitation {
    /// Unit (Dirac) impulse at `t = 0`.
    Impulse,
    /// Unit step starting at `t = 0`.
    Step,
}

/// Discretisation used to advance the state between samples.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discretization {
    /// Exact zero-order hold via the matrix exponential (exact for impulse and step inputs).
    #[default]
    ZeroOrderHold,
    /// Second-order trapezoidal rule (Tustin).
    Trapezoidal,
    /// First-order backward Euler.
    BackwardEuler,
}

/// Errors that can occur while configuring or executing simulations.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Raised when a required parameter is missing.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    /// Raised when the configuration is internally inconsistent.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
    /// Raised when a discretisation step cannot be solved.
    #[error("linear solve failed: {0}")]
    SolveFailed(String),
}

/// Sampled response of a system to an excitation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeResponse {
    /// Sample instants in seconds.
    pub times: Vec<Scalar>,
    /// Output amplitude at each instant.
    pub values: Vec<Scalar>,
}

impl TimeResponse {
    /// Total captured samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// True if no samples recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterator over `(time, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (Scalar, Scalar)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Last sampled value.
    #[must_use]
    pub fn final_value(&self) -> Option<Scalar> {
        self.values.last().copied()
    }

    /// Largest absolute amplitude and the instant it occurs.
    #[must_use]
    pub fn peak(&self) -> Option<(Scalar, Scalar)> {
        self.points()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

/// Controllable canonical realization `x' = A x + B u`, `y = C x + D u`.
///
/// The state is rescaled by the denominator's root scale so that every entry of
/// `A` has a magnitude comparable to the pole frequencies. Badly scaled physical
/// coefficients (nanofarads times millihenries) otherwise wreck the matrix exponential.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    /// State matrix.
    pub a: DMatrix<Scalar>,
    /// Input vector.
    pub b: DVector<Scalar>,
    /// Output vector.
    pub c: DVector<Scalar>,
    /// Feedthrough.
    pub d: Scalar,
}

impl StateSpace {
    /// Realizes a proper transfer function.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfig`] for improper transfer functions.
    pub fn from_transfer_function(tf: &TransferFunction) -> Result<Self, SimulationError> {
        if !tf.is_proper() {
            return Err(SimulationError::InvalidConfig(
                "improper transfer function cannot be realized".into(),
            ));
        }
        let den = tf.denominator();
        let (Some(monic), Some(lead)) = (den.monic(), den.leading()) else {
            return Err(SimulationError::InvalidConfig("zero denominator".into()));
        };
        let n = tf.order();

        let num = tf.numerator().coefficients();
        let mut b = vec![0.0; n + 1];
        let offset = n + 1 - num.len();
        for (i, c) in num.iter().enumerate() {
            b[offset + i] = c / lead;
        }
        let d = b[0];

        let scale = den.root_scale();
        let mut a = DMatrix::zeros(n, n);
        let mut c = DVector::zeros(n);
        for j in 0..n {
            a[(0, j)] = -monic[j + 1] / scale.powi(j as i32);
            c[j] = (b[j + 1] - d * monic[j + 1]) * scale.powi((n - 1 - j) as i32);
        }
        for i in 1..n {
            a[(i, i - 1)] = scale;
        }
        let mut input = DVector::zeros(n);
        if n > 0 {
            input[0] = 1.0 / scale.powi(n as i32 - 1);
        }

        Ok(Self { a, b: input, c, d })
    }

    /// Number of states.
    #[must_use]
    pub fn order(&self) -> usize {
        self.a.nrows()
    }

    /// Output `y = C x + D u`.
    #[must_use]
    pub fn output(&self, x: &DVector<Scalar>, u: Scalar) -> Scalar {
        self.c.dot(x) + self.d * u
    }

    /// Discrete transition `x[k+1] = Φ x[k] + Γ u` for a constant input over step `h`.
    ///
    /// # Errors
    /// Returns [`SimulationError::SolveFailed`] when an implicit update is singular.
    pub fn discretize(
        &self,
        h: Scalar,
        method: Discretization,
    ) -> Result<(DMatrix<Scalar>, DVector<Scalar>), SimulationError> {
        let n = self.order();
        let identity = DMatrix::<Scalar>::identity(n, n);
        match method {
            Discretization::ZeroOrderHold => {
                // exp([[A, B], [0, 0]] h) = [[Φ, Γ], [0, 1]]
                let mut augmented = DMatrix::zeros(n + 1, n + 1);
                for i in 0..n {
                    for j in 0..n {
                        augmented[(i, j)] = self.a[(i, j)] * h;
                    }
                    augmented[(i, n)] = self.b[i] * h;
                }
                let e = augmented.exp();
                let phi = DMatrix::from_fn(n, n, |i, j| e[(i, j)]);
                let gamma = DVector::from_fn(n, |i, _| e[(i, n)]);
                Ok((phi, gamma))
            }
            Discretization::Trapezoidal => {
                let half = &self.a * (h / 2.0);
                let lu = (&identity - &half).lu();
                let phi = lu
                    .solve(&(&identity + &half))
                    .ok_or_else(|| SimulationError::SolveFailed("trapezoidal update".into()))?;
                let gamma = lu
                    .solve(&(&self.b * h))
                    .ok_or_else(|| SimulationError::SolveFailed("trapezoidal input".into()))?;
                Ok((phi, gamma))
            }
            Discretization::BackwardEuler => {
                let lu = (&identity - &self.a * h).lu();
                let phi = lu
                    .solve(&identity)
                    .ok_or_else(|| SimulationError::SolveFailed("backward Euler update".into()))?;
                let gamma = lu
                    .solve(&(&self.b * h))
                    .ok_or_else(|| SimulationError::SolveFailed("backward Euler input".into()))?;
                Ok((phi, gamma))
            }
        }
    }
}

/// Default simulator: state-space realization stepped across the requested instants.
///
/// Instants need not be uniform; the discretisation is recomputed whenever the step
/// changes. The `D·δ(t)` part of a biproper impulse response is not representable
/// on a grid and is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateSpaceSimulator;

impl ResponseSimulator for StateSpaceSimulator {
    fn simulate(
        &self,
        tf: &TransferFunction,
        excitation: Excitation,
        times: &[Scalar],
        method: Discretization,
    ) -> Result<TimeResponse, SimulationError> {
        validate_times(times)?;
        let _span =
            tracing::debug_span!("simulate", ?excitation, ?method, samples = times.len()).entered();

        let ss = StateSpace::from_transfer_function(tf)?;
        let u = match excitation {
            Excitation::Impulse => 0.0,
            Excitation::Step => 1.0,
        };
        if ss.order() == 0 {
            return Ok(TimeResponse {
                times: times.to_vec(),
                values: vec![ss.d * u; times.len()],
            });
        }

        let mut x = match excitation {
            Excitation::Impulse => ss.b.clone(),
            Excitation::Step => DVector::zeros(ss.order()),
        };
        let mut values = Vec::with_capacity(times.len());
        let mut cached: Option<(Scalar, DMatrix<Scalar>, DVector<Scalar>)> = None;
        let mut previous = 0.0;
        for &t in times {
            let h = t - previous;
            if h > 0.0 {
                let reusable = cached
                    .as_ref()
                    .is_some_and(|(step, _, _)| (step - h).abs() <= STEP_REUSE_TOLERANCE * h);
                if !reusable {
                    let (phi, gamma) = ss.discretize(h, method)?;
                    cached = Some((h, phi, gamma));
                }
                if let Some((_, phi, gamma)) = &cached {
                    x = phi * &x + gamma * u;
                }
            }
            values.push(ss.output(&x, u));
            previous = t;
        }

        Ok(TimeResponse {
            times: times.to_vec(),
            values,
        })
    }
}

fn validate_times(times: &[Scalar]) -> Result<(), SimulationError> {
    let first = *times.first().ok_or(SimulationError::MissingParameter("times"))?;
    if !first.is_finite() || first < 0.0 {
        return Err(SimulationError::InvalidConfig(format!(
            "time grid must start at t >= 0, got {first}"
        )));
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(SimulationError::InvalidConfig("time grid contains non-finite values".into()));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SimulationError::InvalidConfig("time grid must be strictly increasing".into()));
    }
    Ok(())
}

use std::io;
use std::io::Write;

/// Writes a CSV of a sampled response (`time,<column>`).
pub fn write_response_csv<W: Write>(
    mut w: W,
    response: &TimeResponse,
    column: &str,
) -> io::Result<()> {
    writeln!(w, "time,{column}")?;
    for (time, value) in response.points() {
        writeln!(w, "{:.16e},{:.16e}", time, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use num_complex::Complex;

    use super::*;
    use crate::grid::linspace;
    use crate::math::{real, CScalar};

    fn first_order() -> TransferFunction {
        TransferFunction::new(vec![1.0], vec![1.0, 1.0]).unwrap()
    }

    #[test]
    fn zero_order_hold_is_exact_for_first_order() {
        let times = linspace(0.0, 5.0, 51);
        let impulse = StateSpaceSimulator
            .simulate(&first_order(), Excitation::Impulse, &times, Discretization::ZeroOrderHold)
            .unwrap();
        let step = StateSpaceSimulator
            .simulate(&first_order(), Excitation::Step, &times, Discretization::ZeroOrderHold)
            .unwrap();
        for (i, t) in times.iter().enumerate() {
            assert_relative_eq!(impulse.values[i], (-t).exp(), epsilon = 1.0e-12);
            assert_relative_eq!(step.values[i], 1.0 - (-t).exp(), epsilon = 1.0e-12);
        }
    }

    #[test]
    fn implicit_methods_converge_to_exact_response() {
        let times = linspace(0.0, 5.0, 5001);
        for (method, tol) in [
            (Discretization::Trapezoidal, 1.0e-6),
            (Discretization::BackwardEuler, 1.0e-3),
        ] {
            let step = StateSpaceSimulator
                .simulate(&first_order(), Excitation::Step, &times, method)
                .unwrap();
            for (t, y) in step.points() {
                assert_relative_eq!(y, 1.0 - (-t).exp(), epsilon = tol);
            }
        }
    }

    #[test]
    fn non_uniform_grid_matches_uniform_result() {
        let times = vec![0.0, 0.1, 0.15, 0.5, 1.7, 3.0];
        let response = StateSpaceSimulator
            .simulate(&first_order(), Excitation::Impulse, &times, Discretization::ZeroOrderHold)
            .unwrap();
        for (t, y) in response.points() {
            assert_relative_eq!(y, (-t).exp(), epsilon = 1.0e-12);
        }
    }

    #[test]
    fn grid_starting_after_zero_is_propagated() {
        let response = StateSpaceSimulator
            .simulate(&first_order(), Excitation::Impulse, &[1.0, 2.0], Discretization::ZeroOrderHold)
            .unwrap();
        assert_relative_eq!(response.values[0], (-1.0_f64).exp(), epsilon = 1.0e-12);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let tf = first_order();
        let sim = |times: &[Scalar]| {
            StateSpaceSimulator.simulate(&tf, Excitation::Step, times, Discretization::default())
        };
        assert!(matches!(sim(&[]), Err(SimulationError::MissingParameter("times"))));
        assert!(matches!(sim(&[-1.0, 0.0]), Err(SimulationError::InvalidConfig(_))));
        assert!(matches!(sim(&[0.0, 1.0, 1.0]), Err(SimulationError::InvalidConfig(_))));
        assert!(matches!(sim(&[0.0, f64::NAN]), Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn improper_systems_cannot_be_realized() {
        let tf = TransferFunction::new(vec![1.0, 0.0, 0.0], vec![1.0, 1.0]).unwrap();
        assert!(StateSpace::from_transfer_function(&tf).is_err());
    }

    #[test]
    fn static_gain_has_flat_step_and_no_impulse_tail() {
        let tf = TransferFunction::new(vec![3.0], vec![2.0]).unwrap();
        let times = [0.0, 1.0];
        let step = StateSpaceSimulator
            .simulate(&tf, Excitation::Step, &times, Discretization::default())
            .unwrap();
        let impulse = StateSpaceSimulator
            .simulate(&tf, Excitation::Impulse, &times, Discretization::default())
            .unwrap();
        assert_eq!(step.values, vec![1.5, 1.5]);
        assert_eq!(impulse.values, vec![0.0, 0.0]);
    }

    #[test]
    fn scaled_realization_preserves_transfer_function() {
        let tf = TransferFunction::new(vec![1.0], vec![2.5e-9, 2.5e-5, 1.0]).unwrap();
        let ss = StateSpace::from_transfer_function(&tf).unwrap();
        let n = ss.order();
        for s in [CScalar::new(0.0, 1.0e4), CScalar::new(-100.0, 3.0e4)] {
            let m = DMatrix::<CScalar>::identity(n, n) * s - ss.a.map(real);
            let x = m.lu().solve(&ss.b.map(real)).unwrap();
            let h: Complex<Scalar> = ss.c.map(real).dot(&x) + ss.d;
            let expected = tf.evaluate(s);
            assert_relative_eq!(h.re, expected.re, max_relative = 1.0e-9, epsilon = 1.0e-12);
            assert_relative_eq!(h.im, expected.im, max_relative = 1.0e-9, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn biproper_step_includes_feedthrough() {
        // (s + 2) / (s + 1): step response 2 - e^{-t}
        let tf = TransferFunction::new(vec![1.0, 2.0], vec![1.0, 1.0]).unwrap();
        let times = linspace(0.0, 3.0, 31);
        let step = StateSpaceSimulator
            .simulate(&tf, Excitation::Step, &times, Discretization::ZeroOrderHold)
            .unwrap();
        for (t, y) in step.points() {
            assert_relative_eq!(y, 2.0 - (-t).exp(), epsilon = 1.0e-12);
        }
    }

    #[test]
    fn response_csv_has_header_and_rows() {
        let response = TimeResponse {
            times: vec![0.0, 1.0],
            values: vec![1.0, 0.5],
        };
        let mut buf = Vec::new();
        write_response_csv(&mut buf, &response, "amplitude").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,amplitude"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn peak_reports_largest_magnitude() {
        let response = TimeResponse {
            times: vec![0.0, 1.0, 2.0],
            values: vec![0.1, -0.7, 0.5],
        };
        assert_eq!(response.peak(), Some((1.0, -0.7)));
        assert_eq!(response.final_value(), Some(0.5));
    }
}
