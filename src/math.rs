//! Shared numerical primitives anchored on `nalgebra` and `num-complex`.

use std::cmp::Ordering;

/// Primary scalar type used across the crate.
pub type Scalar = f64;
/// Primary complex scalar type used for poles, zeros and residues.
pub type CScalar = num_complex::Complex<Scalar>;

/// Lifts a real value into the complex plane.
#[inline]
#[must_use]
pub fn real(value: Scalar) -> CScalar {
    CScalar::new(value, 0.0)
}

/// Returns `k!` as a floating point value.
#[must_use]
pub fn factorial(k: usize) -> Scalar {
    (1..=k).map(|i| i as Scalar).product()
}

/// Orders complex values by real part, then imaginary part.
#[must_use]
pub fn complex_order(a: &CScalar, b: &CScalar) -> Ordering {
    a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im))
}

/// Sorts roots in place so that results are deterministic across backends.
pub fn sort_roots(roots: &mut [CScalar]) {
    roots.sort_by(complex_order);
}

/// Distance between two complex numbers relative to the larger magnitude.
///
/// Two zeros are at distance 0; a zero and any non-zero value are at distance 1.
#[must_use]
pub fn relative_distance(a: CScalar, b: CScalar) -> Scalar {
    let scale = a.norm().max(b.norm());
    if scale == 0.0 {
        return 0.0;
    }
    (a - b).norm() / scale
}
