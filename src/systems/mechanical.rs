use crate::analysis::AnalysisConfig;
use crate::constants::DEFAULT_SAMPLE_COUNT;
use crate::errors::AnalysisError;
use crate::grid::TimeGrid;
use crate::math::Scalar;

use super::{require_non_negative, require_positive, Parameter, PhysicalSystem};

/// Mass, damper and spring of a single-degree-of-freedom oscillator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanicalParameters {
    /// Mass in kilograms.
    pub mass: Scalar,
    /// Viscous damping coefficient in N·s/m.
    pub damping: Scalar,
    /// Spring stiffness in N/m.
    pub stiffness: Scalar,
}

impl Default for MechanicalParameters {
    /// 1 kg, 0.1 N·s/m, 0.5 N/m.
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 0.1,
            stiffness: 0.5,
        }
    }
}

/// Mass-spring-damper with force input and displacement output:
/// `H(s) = 1 / (m s² + c s + k)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MechanicalSystem {
    params: MechanicalParameters,
}

impl MechanicalSystem {
    /// Validates the mechanical parameters.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidParameter`] for a non-positive mass or a
    /// negative damping/stiffness.
    pub fn new(params: MechanicalParameters) -> Result<Self, AnalysisError> {
        require_positive("mass", params.mass)?;
        require_non_negative("damping", params.damping)?;
        require_non_negative("stiffness", params.stiffness)?;
        Ok(Self { params })
    }

    /// Reference oscillator used by the command-line tool.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            params: MechanicalParameters::default(),
        }
    }

    /// Mechanical parameters.
    #[must_use]
    pub fn params(&self) -> &MechanicalParameters {
        &self.params
    }

    /// Damping ratio `c / (2 √(k m))`; infinite without a spring.
    #[must_use]
    pub fn damping_ratio(&self) -> Scalar {
        let p = &self.params;
        p.damping / (2.0 * (p.stiffness * p.mass).sqrt())
    }

    /// Undamped natural frequency `√(k / m)` in rad/s.
    #[must_use]
    pub fn natural_frequency(&self) -> Scalar {
        (self.params.stiffness / self.params.mass).sqrt()
    }
}

impl PhysicalSystem for MechanicalSystem {
    fn name(&self) -> &str {
        "mechanical"
    }

    fn numerator(&self) -> Vec<Scalar> {
        vec![1.0]
    }

    fn denominator(&self) -> Vec<Scalar> {
        let p = &self.params;
        vec![p.mass, p.damping, p.stiffness]
    }

    fn parameters(&self) -> Vec<Parameter> {
        let p = &self.params;
        vec![
            Parameter::new("mass", p.mass, "kg"),
            Parameter::new("damping", p.damping, "N*s/m"),
            Parameter::new("stiffness", p.stiffness, "N/m"),
        ]
    }

    fn default_config(&self) -> AnalysisConfig {
        AnalysisConfig::new(
            TimeGrid::automatic(DEFAULT_SAMPLE_COUNT),
            TimeGrid::fixed(20.0, 500),
        )
    }

    fn output_label(&self) -> &str {
        "Displacement [m]"
    }
}
