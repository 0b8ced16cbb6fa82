//! Rational transfer functions `H(s) = N(s) / D(s)`.

use std::fmt;

use crate::errors::AnalysisError;
use crate::math::{CScalar, Scalar};
use crate::polynomial::Polynomial;

/// Continuous-time SISO transfer function with real polynomial coefficients.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    numerator: Polynomial,
    denominator: Polynomial,
}

impl TransferFunction {
    /// Builds `num(s) / den(s)` from coefficient sequences ordered highest degree first.
    ///
    /// # Errors
    /// Returns [`AnalysisError::SingularSystem`] when the denominator is identically
    /// zero or any coefficient is not finite.
    pub fn new(
        numerator: impl Into<Vec<Scalar>>,
        denominator: impl Into<Vec<Scalar>>,
    ) -> Result<Self, AnalysisError> {
        Self::from_polynomials(
            Polynomial::new(numerator.into()),
            Polynomial::new(denominator.into()),
        )
    }

    /// Builds a transfer function from already-constructed polynomials.
    ///
    /// # Errors
    /// Same conditions as [`TransferFunction::new`].
    pub fn from_polynomials(
        numerator: Polynomial,
        denominator: Polynomial,
    ) -> Result<Self, AnalysisError> {
        if !numerator.is_finite() || !denominator.is_finite() {
            return Err(AnalysisError::SingularSystem(
                "transfer function coefficients must be finite".into(),
            ));
        }
        if denominator.is_zero() {
            return Err(AnalysisError::SingularSystem(
                "denominator polynomial is identically zero".into(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Numerator polynomial.
    #[must_use]
    pub fn numerator(&self) -> &Polynomial {
        &self.numerator
    }

    /// Denominator polynomial.
    #[must_use]
    pub fn denominator(&self) -> &Polynomial {
        &self.denominator
    }

    /// System order (denominator degree).
    #[must_use]
    pub fn order(&self) -> usize {
        self.denominator.degree().unwrap_or(0)
    }

    /// True when the numerator degree is strictly below the denominator degree.
    #[must_use]
    pub fn is_strictly_proper(&self) -> bool {
        match self.numerator.degree() {
            None => true,
            Some(n) => n < self.order(),
        }
    }

    /// True when the numerator degree does not exceed the denominator degree.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.numerator.degree().map_or(true, |n| n <= self.order())
    }

    /// Evaluates `H(s)` at a complex frequency.
    #[must_use]
    pub fn evaluate(&self, s: CScalar) -> CScalar {
        self.numerator.eval_complex(s) / self.denominator.eval_complex(s)
    }

    /// Static gain `H(0)`; `None` when the system has a pole at the origin.
    #[must_use]
    pub fn dc_gain(&self) -> Option<Scalar> {
        let den = self.denominator.eval(0.0);
        if den == 0.0 {
            None
        } else {
            Some(self.numerator.eval(0.0) / den)
        }
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H(s) = ({}) / ({})", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn zero_denominator_is_singular() {
        let err = TransferFunction::new(vec![1.0], vec![0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::SingularSystem(_)));
    }

    #[test]
    fn non_finite_coefficients_are_rejected() {
        assert!(TransferFunction::new(vec![1.0], vec![1.0, f64::NAN, 1.0]).is_err());
        assert!(TransferFunction::new(vec![f64::INFINITY], vec![1.0, 1.0]).is_err());
    }

    #[test]
    fn leading_zero_lowers_order() {
        let tf = TransferFunction::new(vec![1.0], vec![0.0, 2.0, 1.0]).unwrap();
        assert_eq!(tf.order(), 1);
        assert!(tf.is_strictly_proper());
    }

    #[test]
    fn dc_gain_of_mechanical_system_is_compliance() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 0.1, 0.5]).unwrap();
        assert_relative_eq!(tf.dc_gain().unwrap(), 2.0);
        let integrator = TransferFunction::new(vec![1.0], vec![1.0, 0.0]).unwrap();
        assert!(integrator.dc_gain().is_none());
    }

    #[test]
    fn evaluate_matches_direct_formula() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 0.1, 0.5]).unwrap();
        let s = CScalar::new(0.0, 1.0);
        let expected = CScalar::new(1.0, 0.0) / CScalar::new(-0.5, 0.1);
        let h = tf.evaluate(s);
        assert_relative_eq!(h.re, expected.re, epsilon = 1.0e-12);
        assert_relative_eq!(h.im, expected.im, epsilon = 1.0e-12);
    }

    #[test]
    fn display_shows_both_polynomials() {
        let tf = TransferFunction::new(vec![5.0], vec![0.1, 2.54, 11.0]).unwrap();
        assert_eq!(tf.to_string(), "H(s) = (5) / (0.1 s^2 + 2.54 s + 11)");
    }
}
