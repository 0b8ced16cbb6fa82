//! Shared error types used across submodules.

use thiserror::Error;

use crate::math::Scalar;
use crate::simulation::SimulationError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Wraps simulation-related errors.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    /// Raised when a physical parameter is non-finite or outside its physical range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as exposed by the system.
        name: &'static str,
        /// Offending value.
        value: Scalar,
        /// Human-readable constraint that was violated.
        reason: &'static str,
    },
    /// Raised when the denominator polynomial is degenerate.
    #[error("singular system: {0}")]
    SingularSystem(String),
    /// Raised when a plot cannot be rendered or written.
    #[error("plot error: {0}")]
    Plot(String),
    /// Raised when exported data cannot be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InvalidParameter`].
    #[must_use]
    pub fn invalid(name: &'static str, value: Scalar, reason: &'static str) -> Self {
        Self::InvalidParameter { name, value, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message_names_field() {
        let err = AnalysisError::invalid("mass", -1.0, "must be > 0");
        assert_eq!(err.to_string(), "invalid parameter `mass` = -1: must be > 0");
    }

    #[test]
    fn simulation_errors_are_transparent() {
        let err: AnalysisError = SimulationError::MissingParameter("time_span").into();
        assert_eq!(err.to_string(), "missing parameter: time_span");
    }
}
