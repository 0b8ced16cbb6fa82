//! Partial-fraction (residue) expansion of rational transfer functions.
//!
//! A proper transfer function with poles `p_i` of multiplicity `m_i` expands as
//!
//! ```text
//! H(s) = Σ_i Σ_{k=1..m_i} r_ik / (s - p_i)^k  +  direct(s)
//! ```
//!
//! and its inverse Laplace transform for `t ≥ 0` is
//! `h(t) = Σ r_ik · t^(k-1) / (k-1)! · e^(p_i t)`. The `direct` polynomial only
//! contributes impulses at `t = 0` and is reported separately.

use std::fmt;

use crate::backend::ResidueSolver;
use crate::constants::POLE_GROUPING_TOLERANCE;
use crate::errors::AnalysisError;
use crate::math::{factorial, real, relative_distance, CScalar, Scalar};
use crate::transfer::TransferFunction;

/// Single term `residue / (s - pole)^power` of a partial-fraction expansion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueTerm {
    /// Residue (coefficient) of the term.
    pub residue: CScalar,
    /// Pole the term is attached to.
    pub pole: CScalar,
    /// Power of `(s - pole)` in the denominator, starting at 1.
    pub power: usize,
}

impl ResidueTerm {
    /// Complex time-domain contribution `r · t^(k-1)/(k-1)! · e^(p t)`.
    #[must_use]
    pub fn evaluate(&self, t: Scalar) -> CScalar {
        let k = self.power.saturating_sub(1);
        let envelope = t.powi(k as i32) / factorial(k);
        self.residue * envelope * (self.pole * t).exp()
    }

    /// Real part of [`ResidueTerm::evaluate`], the quantity drawn in component plots.
    #[must_use]
    pub fn evaluate_real(&self, t: Scalar) -> Scalar {
        self.evaluate(t).re
    }
}

impl fmt::Display for ResidueTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "residue {:.3}, pole {:.3}", self.residue, self.pole)?;
        if self.power > 1 {
            write!(f, " (power {})", self.power)?;
        }
        Ok(())
    }
}

/// Complete partial-fraction expansion.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialFractions {
    terms: Vec<ResidueTerm>,
    direct: Vec<Scalar>,
}

impl PartialFractions {
    /// Creates an expansion from explicit terms and direct polynomial coefficients.
    #[must_use]
    pub fn new(terms: Vec<ResidueTerm>, direct: Vec<Scalar>) -> Self {
        Self { terms, direct }
    }

    /// Expansion terms, grouped per pole with ascending power.
    #[must_use]
    pub fn terms(&self) -> &[ResidueTerm] {
        &self.terms
    }

    /// Direct polynomial term (highest degree first); empty for strictly proper systems.
    #[must_use]
    pub fn direct(&self) -> &[Scalar] {
        &self.direct
    }

    /// Residues in term order.
    #[must_use]
    pub fn residues(&self) -> Vec<CScalar> {
        self.terms.iter().map(|t| t.residue).collect()
    }

    /// Poles in term order (a repeated pole appears once per power).
    #[must_use]
    pub fn poles(&self) -> Vec<CScalar> {
        self.terms.iter().map(|t| t.pole).collect()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the expansion has no pole terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when at least one pole has multiplicity greater than one.
    #[must_use]
    pub fn has_repeated_poles(&self) -> bool {
        self.terms.iter().any(|t| t.power > 1)
    }

    /// Reconstructed impulse response `h(t)` for `t ≥ 0` (direct impulses excluded).
    #[must_use]
    pub fn evaluate(&self, t: Scalar) -> Scalar {
        self.terms.iter().map(|term| term.evaluate_real(t)).sum()
    }
}

/// Residue solver supporting repeated poles.
///
/// Roots closer than `tolerance`, relative to their magnitude, are merged into one
/// pole whose value is the mean of the cluster; each cluster then yields one term
/// per power. A conjugate pair `σ ± jω` is `2|ω| / |p|` apart, so it only merges
/// when it is numerically indistinguishable from a real double pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedResidues {
    /// Relative grouping tolerance for repeated poles.
    pub tolerance: Scalar,
}

impl Default for GeneralizedResidues {
    fn default() -> Self {
        Self {
            tolerance: POLE_GROUPING_TOLERANCE,
        }
    }
}

impl ResidueSolver for GeneralizedResidues {
    fn decompose(
        &self,
        tf: &TransferFunction,
        poles: &[CScalar],
    ) -> Result<PartialFractions, AnalysisError> {
        let order = tf.order();
        if poles.len() != order {
            return Err(AnalysisError::SingularSystem(format!(
                "expected {order} poles for the denominator, root finder returned {}",
                poles.len()
            )));
        }
        let (direct, remainder) = tf
            .numerator()
            .div_rem(tf.denominator())
            .ok_or_else(|| AnalysisError::SingularSystem("zero denominator".into()))?;
        let lead = tf
            .denominator()
            .leading()
            .ok_or_else(|| AnalysisError::SingularSystem("zero denominator".into()))?;

        let clusters = cluster_poles(poles, self.tolerance);
        let numerator: Vec<CScalar> = remainder.coefficients().iter().map(|c| real(*c)).collect();

        let mut terms = Vec::with_capacity(order);
        for (i, &(pole, multiplicity)) in clusters.iter().enumerate() {
            // Q(s) = lead * Π_{j != i} (s - p_j)^{m_j}, so that H(s) = N(s) / ((s - p)^m Q(s)).
            let mut others = vec![real(lead)];
            for (j, &(other, count)) in clusters.iter().enumerate() {
                if i == j {
                    continue;
                }
                for _ in 0..count {
                    others = poly_mul(&others, &[real(1.0), -other]);
                }
            }

            let n_series = taylor_coefficients(&numerator, pole, multiplicity);
            let q_series = taylor_coefficients(&others, pole, multiplicity);
            if q_series[0].norm() == 0.0 {
                return Err(AnalysisError::SingularSystem(format!(
                    "poles too close to separate near {pole}"
                )));
            }
            let series = series_divide(&n_series, &q_series);

            // series[k] multiplies (s - p)^(k - m), i.e. power m - k.
            for power in 1..=multiplicity {
                terms.push(ResidueTerm {
                    residue: series[multiplicity - power],
                    pole,
                    power,
                });
            }
        }

        Ok(PartialFractions::new(terms, direct.coefficients().to_vec()))
    }
}

/// Groups nearby roots, returning `(mean pole, multiplicity)` pairs in input order.
fn cluster_poles(poles: &[CScalar], tolerance: Scalar) -> Vec<(CScalar, usize)> {
    let mut clusters: Vec<(CScalar, CScalar, usize)> = Vec::new();
    for &p in poles {
        match clusters
            .iter_mut()
            .find(|(anchor, _, _)| relative_distance(*anchor, p) <= tolerance)
        {
            Some((_, sum, count)) => {
                *sum += p;
                *count += 1;
            }
            None => clusters.push((p, p, 1)),
        }
    }
    clusters
        .into_iter()
        .map(|(_, sum, count)| (sum / count as Scalar, count))
        .collect()
}

fn poly_mul(a: &[CScalar], b: &[CScalar]) -> Vec<CScalar> {
    let mut out = vec![CScalar::default(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// First `count` Taylor coefficients of `poly` (highest degree first) about `point`,
/// lowest order first, via repeated synthetic division.
fn taylor_coefficients(poly: &[CScalar], point: CScalar, count: usize) -> Vec<CScalar> {
    let mut work = poly.to_vec();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        if work.is_empty() {
            out.push(CScalar::default());
            continue;
        }
        let mut acc = CScalar::default();
        let mut quotient = Vec::with_capacity(work.len() - 1);
        for (i, c) in work.iter().enumerate() {
            acc = acc * point + c;
            if i + 1 < work.len() {
                quotient.push(acc);
            }
        }
        out.push(acc);
        work = quotient;
    }
    out
}

/// Power-series quotient `n / q` truncated to `n.len()` terms (`q[0] != 0`).
fn series_divide(n: &[CScalar], q: &[CScalar]) -> Vec<CScalar> {
    let mut c: Vec<CScalar> = Vec::with_capacity(n.len());
    for k in 0..n.len() {
        let mut acc = n[k];
        for i in 1..=k.min(q.len() - 1) {
            acc -= q[i] * c[k - i];
        }
        c.push(acc / q[0]);
    }
    c
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::backend::RootFinder;
    use crate::polynomial::CompanionRoots;

    fn expand(num: Vec<Scalar>, den: Vec<Scalar>) -> PartialFractions {
        let tf = TransferFunction::new(num, den).unwrap();
        let poles = CompanionRoots.roots(tf.denominator());
        GeneralizedResidues::default().decompose(&tf, &poles).unwrap()
    }

    #[test]
    fn distinct_real_poles() {
        // (s + 3) / ((s + 1)(s + 2)) = 2/(s + 1) - 1/(s + 2)
        let pf = expand(vec![1.0, 3.0], vec![1.0, 3.0, 2.0]);
        assert_eq!(pf.len(), 2);
        assert!(pf.direct().is_empty());
        for term in pf.terms() {
            let expected = if term.pole.re < -1.5 { -1.0 } else { 2.0 };
            assert_relative_eq!(term.residue.re, expected, epsilon = 1.0e-10);
            assert_relative_eq!(term.residue.im, 0.0, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn slow_underdamped_pair_stays_oscillatory() {
        // poles -1e-4 ± 4e-4j: h(t) = e^{-1e-4 t} sin(4e-4 t) / 4e-4
        let pf = expand(vec![1.0], vec![1.0, 2.0e-4, 1.7e-7]);
        assert_eq!(pf.len(), 2);
        assert!(!pf.has_repeated_poles());
        for term in pf.terms() {
            assert_relative_eq!(term.pole.im.abs(), 4.0e-4, max_relative = 1.0e-9);
            assert_relative_eq!(term.residue.im.abs(), 1250.0, max_relative = 1.0e-9);
        }
        for t in [1000.0_f64, 5000.0, 20_000.0] {
            let expected = (-1.0e-4 * t).exp() * (4.0e-4 * t).sin() / 4.0e-4;
            assert_relative_eq!(pf.evaluate(t), expected, epsilon = 1.0e-6 * 1750.0);
        }
    }

    #[test]
    fn slow_distinct_real_poles_stay_separate() {
        // 1 / ((s + 5e-4)(s + 1e-3)) = 2000/(s + 5e-4) - 2000/(s + 1e-3)
        let pf = expand(vec![1.0], vec![1.0, 1.5e-3, 5.0e-7]);
        assert_eq!(pf.len(), 2);
        assert!(!pf.has_repeated_poles());
        for term in pf.terms() {
            let expected = if term.pole.re < -7.5e-4 { -2000.0 } else { 2000.0 };
            assert_relative_eq!(term.residue.re, expected, max_relative = 1.0e-9);
        }
        let t = 1000.0_f64;
        let expected = 2000.0 * ((-5.0e-4 * t).exp() - (-1.0e-3 * t).exp());
        assert_relative_eq!(pf.evaluate(t), expected, max_relative = 1.0e-9);
    }

    #[test]
    fn clustering_is_independent_of_pole_magnitude() {
        for scale in [1.0e-6_f64, 1.0, 1.0e6] {
            let pair = [CScalar::new(-1.0, 4.0) * scale, CScalar::new(-1.0, -4.0) * scale];
            assert_eq!(cluster_poles(&pair, POLE_GROUPING_TOLERANCE).len(), 2);

            // Eigenvalue solvers split a real double root into a tight conjugate pair.
            let split = [CScalar::new(-3.0, 1.0e-8) * scale, CScalar::new(-3.0, -1.0e-8) * scale];
            let merged = cluster_poles(&split, POLE_GROUPING_TOLERANCE);
            assert_eq!(merged.len(), 1);
            assert_eq!(merged[0].1, 2);
            assert_relative_eq!(merged[0].0.re, -3.0 * scale, max_relative = 1.0e-12);
            assert_eq!(merged[0].0.im, 0.0);
        }
    }

    #[test]
    fn complex_pair_residues_are_conjugate() {
        let pf = expand(vec![1.0], vec![1.0, 0.1, 0.5]);
        let r = pf.residues();
        assert_relative_eq!(r[0].re, r[1].re, epsilon = 1.0e-12);
        assert_relative_eq!(r[0].im, -r[1].im, epsilon = 1.0e-12);
        // 1 / (p1 - p2) with p1 - p2 = 2j·ωd
        let wd = 0.4975_f64.sqrt();
        assert_relative_eq!(r[0].im.abs(), 1.0 / (2.0 * wd), epsilon = 1.0e-10);
        assert_relative_eq!(pf.evaluate(0.0), 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn improper_function_has_direct_term() {
        // (s^2 + 1) / (s^2 + 3s + 2) = 1 + 2/(s + 1) - 5/(s + 2)
        let pf = expand(vec![1.0, 0.0, 1.0], vec![1.0, 3.0, 2.0]);
        assert_eq!(pf.direct(), &[1.0]);
        for term in pf.terms() {
            let expected = if term.pole.re < -1.5 { -5.0 } else { 2.0 };
            assert_relative_eq!(term.residue.re, expected, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn double_pole_produces_ramp_term() {
        // 1 / (s + 1)^2  ->  h(t) = t e^{-t}
        let pf = expand(vec![1.0], vec![1.0, 2.0, 1.0]);
        assert!(pf.has_repeated_poles());
        assert_eq!(pf.len(), 2);
        assert_eq!(pf.terms()[0].power, 1);
        assert_eq!(pf.terms()[1].power, 2);
        assert_relative_eq!(pf.terms()[0].pole.re, -1.0, epsilon = 1.0e-9);
        assert_relative_eq!(pf.terms()[0].residue.norm(), 0.0, epsilon = 1.0e-7);
        assert_relative_eq!(pf.terms()[1].residue.re, 1.0, epsilon = 1.0e-7);
        assert_relative_eq!(pf.evaluate(1.0), (-1.0_f64).exp(), epsilon = 1.0e-7);
    }

    #[test]
    fn triple_pole_uses_factorial_envelope() {
        // 1 / (s + 2)^3  ->  h(t) = t^2/2 e^{-2t}
        let pf = expand(vec![1.0], vec![1.0, 6.0, 12.0, 8.0]);
        assert_eq!(pf.len(), 3);
        let t: Scalar = 0.75;
        let expected = t * t / 2.0 * (-2.0 * t).exp();
        assert_relative_eq!(pf.evaluate(t), expected, epsilon = 1.0e-6);
    }

    #[test]
    fn mismatched_pole_count_is_rejected() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, 0.1, 0.5]).unwrap();
        let err = GeneralizedResidues::default()
            .decompose(&tf, &[real(-1.0)])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::SingularSystem(_)));
    }

    #[test]
    fn taylor_coefficients_match_derivatives() {
        // P(s) = s^3 about 1: 1 + 3u + 3u^2 + u^3
        let p = vec![real(1.0), real(0.0), real(0.0), real(0.0)];
        let c = taylor_coefficients(&p, real(1.0), 4);
        let expected = [1.0, 3.0, 3.0, 1.0];
        for (got, want) in c.iter().zip(expected) {
            assert_relative_eq!(got.re, want, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn term_label_mentions_power_only_when_repeated() {
        let term = ResidueTerm {
            residue: real(1.0),
            pole: real(-2.0),
            power: 2,
        };
        assert!(term.to_string().ends_with("(power 2)"));
    }
}
