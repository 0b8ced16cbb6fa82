use crate::analysis::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::grid::TimeGrid;
use crate::math::Scalar;

use super::{require_non_negative, require_positive, Parameter, PhysicalSystem};

/// Electrical and mechanical constants of an armature-controlled DC motor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorParameters {
    /// Armature inductance `Ld` in henries.
    pub inductance: Scalar,
    /// Armature resistance `Rd` in ohms.
    pub resistance: Scalar,
    /// Torque constant `Kf` in N·m/A.
    pub torque_constant: Scalar,
    /// Back-EMF constant `Ke` in V·s/rad.
    pub back_emf_constant: Scalar,
    /// Rotor inertia `Jm` in kg·m².
    pub inertia: Scalar,
    /// Viscous friction `b` in N·m·s.
    pub friction: Scalar,
}

impl Default for MotorParameters {
    fn default() -> Self {
        Self {
            inductance: 0.02,
            resistance: 0.5,
            torque_constant: 5.0,
            back_emf_constant: 2.0,
            inertia: 5.0,
            friction: 2.0,
        }
    }
}

/// Voltage to angular-velocity model
/// `H(s) = Kf / (Ld Jm s² + (Ld b + Rd Jm) s + (Rd b + Kf Ke))`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorSystem {
    params: MotorParameters,
}

impl MotorSystem {
    /// Validates the motor constants.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidParameter`] when the inductance, inertia or
    /// torque constant is not strictly positive, or another constant is negative.
    pub fn new(params: MotorParameters) -> Result<Self, AnalysisError> {
        require_positive("inductance", params.inductance)?;
        require_non_negative("resistance", params.resistance)?;
        require_positive("torque_constant", params.torque_constant)?;
        require_non_negative("back_emf_constant", params.back_emf_constant)?;
        require_positive("inertia", params.inertia)?;
        require_non_negative("friction", params.friction)?;
        Ok(Self { params })
    }

    /// Reference motor used by the command-line tool.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            params: MotorParameters::default(),
        }
    }

    /// Motor constants.
    #[must_use]
    pub fn params(&self) -> &MotorParameters {
        &self.params
    }
}

impl PhysicalSystem for MotorSystem {
    fn name(&self) -> &str {
        "motor"
    }

    fn numerator(&self) -> Vec<Scalar> {
        vec![self.params.torque_constant]
    }

    fn denominator(&self) -> Vec<Scalar> {
        let p = &self.params;
        vec![
            p.inductance * p.inertia,
            p.inductance * p.friction + p.resistance * p.inertia,
            p.resistance * p.friction + p.torque_constant * p.back_emf_constant,
        ]
    }

    fn parameters(&self) -> Vec<Parameter> {
        let p = &self.params;
        vec![
            Parameter::new("Ld", p.inductance, "H"),
            Parameter::new("Rd", p.resistance, "Ohm"),
            Parameter::new("Kf", p.torque_constant, "N*m/A"),
            Parameter::new("Ke", p.back_emf_constant, "V*s/rad"),
            Parameter::new("Jm", p.inertia, "kg*m^2"),
            Parameter::new("b", p.friction, "N*m*s"),
        ]
    }

    fn default_config(&self) -> AnalysisConfig {
        AnalysisConfig::new(TimeGrid::fixed(2.0, 1000), TimeGrid::fixed(2.0, 1000))
    }

    fn output_label(&self) -> &str {
        "Angular velocity [rad/s]"
    }
}
