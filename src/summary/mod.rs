//! summary — posterior reduction and convergence diagnostics.
//!
//! Purpose
//! -------
//! Turn raw MCMC draws into the figures an analyst reads: the break date,
//! its credible interval, regime means, the relative effect, and whether
//! the chains can be trusted.
//!
//! Key behaviors
//! -------------
//! - [`PosteriorSummary::from_samples`] pools chains for point summaries.
//! - [`Diagnostics`] keeps chains separate for split R-hat and ESS.
//! - [`EffectSize`] represents an undefined percentage change explicitly.
//!
//! Conventions
//! -----------
//! - Order statistics (median, quantiles) use `statrs`' `Data`.

pub mod diagnostics;
pub mod effect;
pub mod errors;
pub mod posterior;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::diagnostics::{Diagnostics, ParamDiagnostics, effective_sample_size, split_rhat};
pub use self::effect::{EFFECT_FLOOR, EffectSize};
pub use self::errors::{SummaryError, SummaryResult};
pub use self::posterior::{CredibleInterval, DEFAULT_CI_LEVEL, PosteriorSummary};
