//! Model-space parameters and the unconstrained sampler space.
//!
//! The continuous block is sampled on `θ = [mu_before, mu_after, ln sigma]`
//! so the gradient-based step never proposes a non-positive volatility.
//! `tau` stays a plain index and never enters `θ`.
use crate::changepoint::errors::{ModelError, ModelResult};
use ndarray::{Array1, array};
use serde::{Deserialize, Serialize};

/// Length of the unconstrained continuous block.
pub const THETA_DIM: usize = 3;

/// Position of `mu_before` in `θ`.
pub const MU_BEFORE: usize = 0;
/// Position of `mu_after` in `θ`.
pub const MU_AFTER: usize = 1;
/// Position of `ln sigma` in `θ`.
pub const LOG_SIGMA: usize = 2;

/// A full parameter point `(tau, mu_before, mu_after, sigma)` in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangePointParams {
    pub tau: usize,
    pub mu_before: f64,
    pub mu_after: f64,
    pub sigma: f64,
}

impl ChangePointParams {
    /// Validated constructor.
    ///
    /// Errors
    /// ------
    /// - `ModelError::NonFiniteMean` if either mean is NaN/±∞.
    /// - `ModelError::InvalidSigma` unless `sigma` is finite and > 0.
    ///
    /// Range checks on `tau` need the series length and happen in the model.
    pub fn new(tau: usize, mu_before: f64, mu_after: f64, sigma: f64) -> ModelResult<Self> {
        if !mu_before.is_finite() {
            return Err(ModelError::NonFiniteMean { name: "mu_before", value: mu_before });
        }
        if !mu_after.is_finite() {
            return Err(ModelError::NonFiniteMean { name: "mu_after", value: mu_after });
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ModelError::InvalidSigma { value: sigma });
        }
        Ok(ChangePointParams { tau, mu_before, mu_after, sigma })
    }

    /// Map the continuous block to `θ = [mu_before, mu_after, ln sigma]`.
    pub fn theta(&self) -> Array1<f64> {
        array![self.mu_before, self.mu_after, self.sigma.ln()]
    }

    /// Rebuild a parameter point from `tau` and an unconstrained `θ`.
    ///
    /// Errors
    /// ------
    /// - `ModelError::ThetaLengthMismatch` if `θ.len() != 3`.
    /// - Any error from [`ChangePointParams::new`] (e.g. `exp` overflow).
    pub fn from_theta(tau: usize, theta: &Array1<f64>) -> ModelResult<Self> {
        if theta.len() != THETA_DIM {
            return Err(ModelError::ThetaLengthMismatch {
                expected: THETA_DIM,
                actual: theta.len(),
            });
        }
        Self::new(tau, theta[MU_BEFORE], theta[MU_AFTER], theta[LOG_SIGMA].exp())
    }
}
