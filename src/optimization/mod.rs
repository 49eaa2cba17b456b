//! optimization — conditional-mode search and its error surface.
//!
//! Purpose
//! -------
//! Provide the numerical layer shared by chain initialization and the
//! gradient-based sampler: the [`LogDensity`](mode_finder::LogDensity)
//! trait, an L-BFGS maximizer over it, and a single error enum.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; every public
//!   value is expressed in terms of `ℓ`.
//! - Fallible entry points return [`OptResult`](errors::OptResult); raw
//!   Argmin errors never cross this module's boundary.
//! - Logging is limited to debug-level traces of the starting point; the
//!   caller decides how to report a failed search.

pub mod errors;
pub mod mode_finder;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::mode_finder::{
        Cost, Grad, GradientSource, LineSearcher, LogDensity, ModeOptions, OptimOutcome, Theta,
        Tolerances, maximize,
    };
}
