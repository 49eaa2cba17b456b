//! changepoint — Bayesian single change-point model.
//!
//! Purpose
//! -------
//! Declare the generative model for a log-return series with one unknown
//! break in its mean:
//!
//! ```text
//! tau        ~ DiscreteUniform(0, n − 1)
//! mu_before  ~ Normal(0, 0.02)
//! mu_after   ~ Normal(0, 0.02)
//! sigma      ~ HalfNormal(0.01)
//! y_i        ~ Normal(mu_before if i < tau else mu_after, sigma)
//! ```
//!
//! The model is data plus densities. It does not sample; see
//! [`crate::sampler`] for posterior draws.
//!
//! Key behaviors
//! -------------
//! - [`ChangePointPriors`] is the serializable prior specification with the
//!   defaults above.
//! - [`ChangePointModel`] binds observations and priors and evaluates the
//!   joint density, the unconstrained log-density with gradient, and the
//!   full conditional of `tau`.
//! - [`ChangePointParams`] is a point in model space; `θ` is its
//!   unconstrained view used by gradient-based steps.

pub mod errors;
pub mod model;
pub mod params;
pub mod priors;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{ModelError, ModelResult};
pub use self::model::{ChangePointModel, RegimeStats};
pub use self::params::{ChangePointParams, LOG_SIGMA, MU_AFTER, MU_BEFORE, THETA_DIM};
pub use self::priors::{ChangePointPriors, PriorFamily, PriorSpec};
