//! mode_finder — Argmin-powered maximization of log-densities.
//!
//! Purpose
//! -------
//! Locate the mode of a log-density `ℓ(θ | data)` over an unconstrained
//! vector. The sampler uses it to start chains at the conditional mode of
//! the continuous block given a break index, which shortens warm-up on long
//! series.
//!
//! Key behaviors
//! -------------
//! - [`LogDensity`] is the single seam between models and numerical code;
//!   the HMC step in [`crate::sampler`] consumes the same trait.
//! - [`maximize`] validates the start point, builds an L-BFGS solver with
//!   the configured line search, runs it, and returns an [`OptimOutcome`].
//! - [`adapter::ArgMinAdapter`] negates densities into costs and falls back
//!   to finite differences when a density has no analytic gradient or when
//!   [`GradientSource::FiniteDifference`] is configured.
//! - [`ModeOptions`] is part of the sampler configuration, so the line
//!   search, history size, tolerances and gradient source of chain
//!   initialization are set from code, TOML or the command line.
//!
//! Invariants & assumptions
//! ------------------------
//! - Densities report invalid inputs as [`OptError`](crate::optimization::errors::OptError)
//!   values, never panics.
//! - [`OptimOutcome::value`] is always a log-density, not a cost.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign conventions, the finite-difference fallback,
//!   builder wiring, and recovery of known optima with both line searches.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{
    GradientSource, LineSearcher, LogDensity, ModeOptions, OptimOutcome, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};
