//! Real polynomials in the Laplace variable `s`, coefficients stored highest degree first.

use std::fmt;

use nalgebra::DMatrix;

use crate::backend::RootFinder;
use crate::constants::ROOT_IMAGINARY_CUTOFF;
use crate::math::{sort_roots, CScalar, Scalar};

/// Polynomial with real coefficients, highest-order term first.
///
/// Leading zeros are trimmed on construction, so the stored leading coefficient is
/// always non-zero. The zero polynomial has no coefficients and no degree.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    coeffs: Vec<Scalar>,
}

impl Polynomial {
    /// Creates a polynomial from coefficients ordered highest degree first.
    #[must_use]
    pub fn new(coeffs: impl Into<Vec<Scalar>>) -> Self {
        let mut coeffs = coeffs.into();
        let first = coeffs.iter().position(|c| *c != 0.0).unwrap_or(coeffs.len());
        coeffs.drain(..first);
        Self { coeffs }
    }

    /// Constant polynomial `c`.
    #[must_use]
    pub fn constant(c: Scalar) -> Self {
        Self::new(vec![c])
    }

    /// Coefficients, highest degree first.
    #[must_use]
    pub fn coefficients(&self) -> &[Scalar] {
        &self.coeffs
    }

    /// Degree of the polynomial, `None` for the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// True for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Leading (highest-order) coefficient.
    #[must_use]
    pub fn leading(&self) -> Option<Scalar> {
        self.coeffs.first().copied()
    }

    /// True when every coefficient is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_finite())
    }

    /// Evaluates the polynomial at a real point (Horner).
    #[must_use]
    pub fn eval(&self, x: Scalar) -> Scalar {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }

    /// Evaluates the polynomial at a complex point (Horner).
    #[must_use]
    pub fn eval_complex(&self, s: CScalar) -> CScalar {
        self.coeffs
            .iter()
            .fold(CScalar::default(), |acc, c| acc * s + *c)
    }

    /// First derivative with respect to `s`.
    #[must_use]
    pub fn derivative(&self) -> Self {
        let Some(degree) = self.degree() else {
            return Self::default();
        };
        let coeffs: Vec<Scalar> = self.coeffs[..degree]
            .iter()
            .enumerate()
            .map(|(i, c)| c * (degree - i) as Scalar)
            .collect();
        Self::new(coeffs)
    }

    /// Polynomial long division, returning `(quotient, remainder)`.
    /// Returns `None` when `divisor` is the zero polynomial.
    #[must_use]
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        let lead = divisor.leading()?;
        let n = self.coeffs.len();
        let d = divisor.coeffs.len();
        if n < d {
            return Some((Self::default(), self.clone()));
        }

        let mut rem = self.coeffs.clone();
        let mut quot = vec![0.0; n - d + 1];
        for i in 0..=n - d {
            let factor = rem[i] / lead;
            quot[i] = factor;
            for (j, dc) in divisor.coeffs.iter().enumerate() {
                rem[i + j] -= factor * dc;
            }
        }
        Some((Self::new(quot), Self::new(rem[n - d + 1..].to_vec())))
    }

    /// Coefficients divided by the leading coefficient (`[1, a1, .., an]`).
    #[must_use]
    pub fn monic(&self) -> Option<Vec<Scalar>> {
        let lead = self.leading()?;
        Some(self.coeffs.iter().map(|c| c / lead).collect())
    }

    /// Frequency scale `max_k |a_k|^(1/k)` of the monic polynomial.
    ///
    /// Every root magnitude is bounded by twice this value, so dividing `s` by it brings
    /// the roots close to the unit circle before any matrix work.
    #[must_use]
    pub fn root_scale(&self) -> Scalar {
        let Some(monic) = self.monic() else {
            return 1.0;
        };
        let scale = monic
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, a)| **a != 0.0)
            .map(|(k, a)| a.abs().powf(1.0 / k as Scalar))
            .fold(0.0, Scalar::max);
        if scale > 0.0 && scale.is_finite() {
            scale
        } else {
            1.0
        }
    }

    /// Companion matrix of the polynomial with `s` rescaled by `scale`.
    ///
    /// Eigenvalues of the returned matrix are the roots divided by `scale`.
    /// Returns `None` for constant or zero polynomials.
    #[must_use]
    pub fn scaled_companion(&self, scale: Scalar) -> Option<DMatrix<Scalar>> {
        let monic = self.monic()?;
        let n = monic.len().checked_sub(1).filter(|n| *n > 0)?;
        let mut m = DMatrix::zeros(n, n);
        let mut power = 1.0;
        for j in 0..n {
            power *= scale;
            m[(0, j)] = -monic[j + 1] / power;
        }
        for i in 1..n {
            m[(i, i - 1)] = 1.0;
        }
        Some(m)
    }
}

impl From<Vec<Scalar>> for Polynomial {
    fn from(coeffs: Vec<Scalar>) -> Self {
        Self::new(coeffs)
    }
}

impl From<&[Scalar]> for Polynomial {
    fn from(coeffs: &[Scalar]) -> Self {
        Self::new(coeffs.to_vec())
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(degree) = self.degree() else {
            return write!(f, "0");
        };
        let mut first = true;
        for (i, c) in self.coeffs.iter().enumerate() {
            if *c == 0.0 {
                continue;
            }
            let power = degree - i;
            let magnitude = c.abs();
            if first {
                if *c < 0.0 {
                    write!(f, "-")?;
                }
            } else if *c < 0.0 {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;

            let show_coeff = power == 0 || magnitude != 1.0;
            if show_coeff {
                write_coefficient(f, magnitude)?;
            }
            match power {
                0 => {}
                1 if show_coeff => write!(f, " s")?,
                1 => write!(f, "s")?,
                p if show_coeff => write!(f, " s^{p}")?,
                p => write!(f, "s^{p}")?,
            }
        }
        Ok(())
    }
}

fn write_coefficient(f: &mut fmt::Formatter<'_>, value: Scalar) -> fmt::Result {
    if (1.0e-3..1.0e5).contains(&value) {
        write!(f, "{value}")
    } else {
        write!(f, "{value:e}")
    }
}

/// Root finder based on the eigenvalues of a frequency-scaled companion matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanionRoots;

impl RootFinder for CompanionRoots {
    fn roots(&self, poly: &Polynomial) -> Vec<CScalar> {
        let mut roots = match poly.degree() {
            None | Some(0) => return Vec::new(),
            Some(1) => {
                let c = poly.coefficients();
                vec![CScalar::new(-c[1] / c[0], 0.0)]
            }
            Some(_) => {
                let scale = poly.root_scale();
                let Some(companion) = poly.scaled_companion(scale) else {
                    return Vec::new();
                };
                companion
                    .complex_eigenvalues()
                    .iter()
                    .map(|z| snap_real(CScalar::new(z.re * scale, z.im * scale)))
                    .collect()
            }
        };
        sort_roots(&mut roots);
        roots
    }
}

fn snap_real(z: CScalar) -> CScalar {
    if z.im.abs() <= ROOT_IMAGINARY_CUTOFF * z.norm() {
        CScalar::new(z.re, 0.0)
    } else {
        z
    }
}
