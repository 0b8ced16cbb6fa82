//! Time grids for response simulation and component reconstruction.

use crate::constants::{time_constant, AUTO_SPAN_TIME_CONSTANTS, DEFAULT_SAMPLE_COUNT};
use crate::math::{CScalar, Scalar};
use crate::simulation::SimulationError;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Applies `f` to each sample instant and collects results.
#[must_use]
pub fn sample_map<I, F, T>(times: I, f: F) -> Vec<T>
where
    I: IntoIterator<Item = Scalar>,
    F: FnMut(Scalar) -> T,
{
    times.into_iter().map(f).collect()
}

/// Window length covering [`AUTO_SPAN_TIME_CONSTANTS`] time constants of the slowest
/// decaying pole.
#[must_use]
pub fn automatic_span(poles: &[CScalar]) -> Scalar {
    let slowest = poles
        .iter()
        .map(|p| p.re.abs())
        .fold(Scalar::INFINITY, Scalar::min);
    let rate = if slowest.is_finite() { slowest } else { 0.0 };
    AUTO_SPAN_TIME_CONSTANTS * time_constant(rate)
}

/// Uniform grid `0..=span` with `samples` points; the span may be derived from the poles.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    /// Window length in seconds, `None` to size it from the poles.
    pub span: Option<Scalar>,
    /// Number of samples including both end points.
    pub samples: usize,
}

impl TimeGrid {
    /// Fixed window `[0, span]`.
    #[must_use]
    pub fn fixed(span: Scalar, samples: usize) -> Self {
        Self {
            span: Some(span),
            samples,
        }
    }

    /// Window sized from the slowest pole.
    #[must_use]
    pub fn automatic(samples: usize) -> Self {
        Self {
            span: None,
            samples,
        }
    }

    /// Validates the grid settings.
    ///
    /// # Errors
    /// Returns [`SimulationError::InvalidConfig`] for fewer than two samples or a
    /// non-positive span.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.samples < 2 {
            return Err(SimulationError::InvalidConfig(format!(
                "sample_count must be >= 2, got {}",
                self.samples
            )));
        }
        if let Some(span) = self.span {
            if !(span.is_finite() && span > 0.0) {
                return Err(SimulationError::InvalidConfig(format!(
                    "time_span must be > 0, got {span}"
                )));
            }
        }
        Ok(())
    }

    /// Window length used for the given poles.
    #[must_use]
    pub fn span_for(&self, poles: &[CScalar]) -> Scalar {
        self.span.unwrap_or_else(|| automatic_span(poles))
    }

    /// Sample instants for a system with the given poles.
    ///
    /// # Errors
    /// See [`TimeGrid::validate`].
    pub fn resolve(&self, poles: &[CScalar]) -> Result<Vec<Scalar>, SimulationError> {
        self.validate()?;
        Ok(linspace(0.0, self.span_for(poles), self.samples))
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::automatic(DEFAULT_SAMPLE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_basic() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn sample_map_runs_function() {
        let out = sample_map(vec![1.0, 2.0, 3.0], |t| t * 2.0);
        assert_eq!(out, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn automatic_span_uses_slowest_pole() {
        let poles = [CScalar::new(-5000.0, 19_364.9), CScalar::new(-5000.0, -19_364.9)];
        assert_relative_eq!(automatic_span(&poles), 7.0 / 5000.0, max_relative = 1.0e-12);
        let mixed = [CScalar::new(-1.0, 0.0), CScalar::new(-0.5, 0.0)];
        assert_relative_eq!(automatic_span(&mixed), 14.0);
    }

    #[test]
    fn automatic_span_handles_marginal_and_empty_pole_sets() {
        assert_relative_eq!(automatic_span(&[CScalar::new(0.0, 2.0)]), 7.0);
        assert_relative_eq!(automatic_span(&[]), 7.0);
    }

    #[test]
    fn resolve_builds_uniform_grid() {
        let times = TimeGrid::fixed(2.0, 1000).resolve(&[]).unwrap();
        assert_eq!(times.len(), 1000);
        assert_relative_eq!(times[999], 2.0);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        assert!(TimeGrid::fixed(2.0, 1).validate().is_err());
        assert!(TimeGrid::fixed(-1.0, 10).validate().is_err());
        assert!(TimeGrid::fixed(f64::NAN, 10).validate().is_err());
        assert!(TimeGrid::automatic(10).validate().is_ok());
    }
}
