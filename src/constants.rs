//! Baseline numerical constants and default time-grid settings.
//!
//! ## Defaults
//!
//! The automatic response window follows the usual convention of LTI response
//! routines: simulate for seven time constants of the slowest decaying mode,
//! sampled at 100 points. Fixed windows (the motor responses, every component
//! plot) are set per domain through [`AnalysisConfig`](crate::analysis::AnalysisConfig).

use crate::math::Scalar;

/// Number of time constants covered by an automatically sized response window.
pub const AUTO_SPAN_TIME_CONSTANTS: Scalar = 7.0;
/// Sample count used when a grid does not request one explicitly.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;
/// Relative tolerance under which two poles are treated as one repeated pole.
///
/// Large enough to absorb the `eps^(1/m)` splitting eigenvalue solvers apply to an
/// `m`-fold root (about 1e-8 for double, 1e-5 for triple roots).
pub const POLE_GROUPING_TOLERANCE: Scalar = 1.0e-4;
/// Imaginary parts below this fraction of a root's magnitude are snapped to zero.
pub const ROOT_IMAGINARY_CUTOFF: Scalar = 1.0e-12;
/// Relative mismatch below which two consecutive grid steps share a discretisation.
pub const STEP_REUSE_TOLERANCE: Scalar = 1.0e-9;

/// Returns the time constant `1 / r` of a decay rate `r` (seconds), falling back to 1 s
/// for marginally stable modes.
#[inline]
#[must_use]
pub fn time_constant(decay_rate: Scalar) -> Scalar {
    if decay_rate > 0.0 && decay_rate.is_finite() {
        1.0 / decay_rate
    } else {
        1.0
    }
}
