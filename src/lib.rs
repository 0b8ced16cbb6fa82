#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::all, clippy::cargo, clippy::nursery, missing_docs)]
#![doc = include_str!("../README.md")]

/// Numerical defaults (time-grid conventions, tolerances).
pub mod constants;
/// Shared scalar aliases and small numeric helpers.
pub mod math;
/// Real polynomials and companion-matrix root finding.
pub mod polynomial;
/// Rational transfer functions.
pub mod transfer;
/// Partial-fraction expansion with repeated-pole support.
pub mod residue;
/// Time grids for responses and component reconstruction.
pub mod grid;
/// State-space simulation of impulse and step responses.
pub mod simulation;
/// Pluggable numeric capabilities.
pub mod backend;
/// Electrical, mechanical and DC-motor systems.
pub mod systems;
/// Shared analysis pipeline.
pub mod analysis;
/// SVG rendering of analysis results.
#[cfg(feature = "plot")]
pub mod plot;
/// Error types shared between modules.
pub mod errors;

/// Common exports for downstream crates.
pub mod prelude;
