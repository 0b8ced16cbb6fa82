use crate::analysis::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::grid::TimeGrid;
use crate::math::Scalar;

use super::{require_non_negative, require_positive, Parameter, PhysicalSystem};

/// Component values of the two-branch RLC circuit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricalParameters {
    /// First inductance in henries.
    pub l1: Scalar,
    /// Second inductance in henries.
    pub l2: Scalar,
    /// First resistance in ohms.
    pub r1: Scalar,
    /// Second resistance in ohms.
    pub r2: Scalar,
    /// Capacitance in farads.
    pub c: Scalar,
}

impl Default for ElectricalParameters {
    /// 10 mH, 15 mH, 100 Ω, 150 Ω, 100 nF.
    fn default() -> Self {
        Self {
            l1: 10e-3,
            l2: 15e-3,
            r1: 100.0,
            r2: 150.0,
            c: 100e-9,
        }
    }
}

/// Electrical circuit with `H(s) = 1 / (C(L1+L2) s² + C(R1+R2) s + 1)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricalSystem {
    params: ElectricalParameters,
}

impl ElectricalSystem {
    /// Validates the component values.
    ///
    /// # Errors
    /// Returns [`AnalysisError::InvalidParameter`] when an inductance or the
    /// capacitance is not strictly positive, or a resistance is negative.
    pub fn new(params: ElectricalParameters) -> Result<Self, AnalysisError> {
        require_positive("l1", params.l1)?;
        require_positive("l2", params.l2)?;
        require_non_negative("r1", params.r1)?;
        require_non_negative("r2", params.r2)?;
        require_positive("c", params.c)?;
        Ok(Self { params })
    }

    /// Reference circuit used by the command-line tool.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            params: ElectricalParameters::default(),
        }
    }

    /// Component values.
    #[must_use]
    pub fn params(&self) -> &ElectricalParameters {
        &self.params
    }

    /// `[C(L1+L2), C(R1+R2), 1]`.
    #[must_use]
    pub fn coefficients(&self) -> [Scalar; 3] {
        let p = &self.params;
        [p.c * (p.l1 + p.l2), p.c * (p.r1 + p.r2), 1.0]
    }
}

impl PhysicalSystem for ElectricalSystem {
    fn name(&self) -> &str {
        "electrical"
    }

    fn numerator(&self) -> Vec<Scalar> {
        vec![1.0]
    }

    fn denominator(&self) -> Vec<Scalar> {
        self.coefficients().to_vec()
    }

    fn parameters(&self) -> Vec<Parameter> {
        let p = &self.params;
        vec![
            Parameter::new("L1", p.l1, "H"),
            Parameter::new("L2", p.l2, "H"),
            Parameter::new("R1", p.r1, "Ohm"),
            Parameter::new("R2", p.r2, "Ohm"),
            Parameter::new("C", p.c, "F"),
        ]
    }

    fn default_config(&self) -> AnalysisConfig {
        AnalysisConfig::new(TimeGrid::automatic(100), TimeGrid::fixed(0.002, 1000))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn reference_coefficients() {
        let [s2, s1, s0] = ElectricalSystem::reference().coefficients();
        assert_relative_eq!(s2, 2.5e-9, max_relative = 1.0e-12);
        assert_relative_eq!(s1, 2.5e-5, max_relative = 1.0e-12);
        assert_eq!(s0, 1.0);
    }

    #[test]
    fn numerator_is_unity() {
        assert_eq!(ElectricalSystem::reference().numerator(), vec![1.0]);
    }

    #[test]
    fn rejects_zero_capacitance() {
        let params = ElectricalParameters {
            c: 0.0,
            ..ElectricalParameters::default()
        };
        let err = ElectricalSystem::new(params).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter { name: "c", .. }));
    }

    #[test]
    fn accepts_zero_resistance() {
        let params = ElectricalParameters {
            r1: 0.0,
            r2: 0.0,
            ..ElectricalParameters::default()
        };
        let system = ElectricalSystem::new(params).unwrap();
        assert_eq!(system.coefficients()[1], 0.0);
    }
}
