//! Physical systems that reduce to a second-order transfer function.
//!
//! Each domain implements [`PhysicalSystem`], which is the only per-domain code:
//! everything downstream (roots, residues, simulation, plots) is shared by
//! [`SystemAnalysis`](crate::analysis::SystemAnalysis).

use std::fmt;

use crate::analysis::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::math::Scalar;
use crate::transfer::TransferFunction;

/// Series RLC-type electrical circuit.
pub mod electrical;
/// Mass-spring-damper mechanical system.
pub mod mechanical;
/// Armature-controlled DC motor (voltage to angular velocity).
pub mod motor;

pub use electrical::{ElectricalParameters, ElectricalSystem};
pub use mechanical::{MechanicalParameters, MechanicalSystem};
pub use motor::{MotorParameters, MotorSystem};

/// Named physical parameter with its SI unit, used for reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub name: &'static str,
    /// Value in SI units.
    pub value: Scalar,
    /// Unit symbol.
    pub unit: &'static str,
}

impl Parameter {
    /// Creates a parameter entry.
    #[must_use]
    pub const fn new(name: &'static str, value: Scalar, unit: &'static str) -> Self {
        Self { name, value, unit }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} {}", self.name, self.value, self.unit)
    }
}

/// Strategy deriving transfer-function coefficients from physical parameters.
pub trait PhysicalSystem {
    /// Short identifier (e.g. `mechanical`), used in titles and file names.
    fn name(&self) -> &str;

    /// Numerator coefficients, highest degree first.
    fn numerator(&self) -> Vec<Scalar>;

    /// Denominator coefficients, highest degree first.
    fn denominator(&self) -> Vec<Scalar>;

    /// Physical parameters in declaration order.
    fn parameters(&self) -> Vec<Parameter>;

    /// Default time grids and discretisation for this domain.
    fn default_config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
    }

    /// Axis label for time-domain plots.
    fn output_label(&self) -> &str {
        "Amplitude"
    }

    /// Builds the transfer function.
    ///
    /// # Errors
    /// Returns [`AnalysisError::SingularSystem`] when the leading denominator
    /// coefficient vanishes (the system loses its order) or a coefficient is not finite.
    fn transfer_function(&self) -> Result<TransferFunction, AnalysisError> {
        let denominator = self.denominator();
        if denominator.first().map_or(true, |c| *c == 0.0) {
            return Err(AnalysisError::SingularSystem(format!(
                "{}: leading denominator coefficient is zero",
                self.name()
            )));
        }
        TransferFunction::new(self.numerator(), denominator)
    }
}

/// Rejects non-finite or non-positive values.
pub(crate) fn require_positive(name: &'static str, value: Scalar) -> Result<Scalar, AnalysisError> {
    if !value.is_finite() {
        return Err(AnalysisError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(AnalysisError::invalid(name, value, "must be > 0"));
    }
    Ok(value)
}

/// Rejects non-finite or negative values.
pub(crate) fn require_non_negative(
    name: &'static str,
    value: Scalar,
) -> Result<Scalar, AnalysisError> {
    if !value.is_finite() {
        return Err(AnalysisError::invalid(name, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(AnalysisError::invalid(name, value, "must be >= 0"));
    }
    Ok(value)
}
