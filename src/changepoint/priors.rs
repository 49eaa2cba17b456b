//! changepoint::priors — declarative prior specification.
//!
//! Purpose
//! -------
//! Describe the priors of the single change-point model as plain data: a
//! family tag plus a scale for each continuous parameter. The model layer
//! turns a validated [`ChangePointPriors`] into log-density terms; nothing
//! here evaluates densities on its own except through [`PriorSpec`].
//!
//! Key behaviors
//! -------------
//! - [`ChangePointPriors::default`] encodes the belief that daily log-returns
//!   are small and centred at zero: `mu_before, mu_after ~ Normal(0, 0.02)`,
//!   `sigma ~ HalfNormal(0.01)`.
//! - [`ChangePointPriors::validate`] rejects non-positive scales and family
//!   tags that do not match the parameter's support.
//! - [`PriorSpec::ln_density`] / [`PriorSpec::grad_ln_density`] evaluate the
//!   zero-centred family at a point, using `statrs` for the density.
//!
//! Invariants & assumptions
//! ------------------------
//! - All priors are centred at zero; only their scale is configurable.
//! - The change-point index always has a discrete uniform prior over the
//!   observation window, so it carries no hyperparameter.
//!
//! Conventions
//! -----------
//! - The struct derives `serde` traits with per-field defaults so a partial
//!   TOML table (e.g. only `sigma.scale`) is a valid configuration.
use crate::changepoint::errors::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

/// Default prior scale for both regime means.
pub const DEFAULT_MU_SCALE: f64 = 0.02;

/// Default HalfNormal scale for the shared volatility.
pub const DEFAULT_SIGMA_SCALE: f64 = 0.01;

/// Zero-centred prior families supported by the model.
///
/// - `Normal`: support ℝ, density `N(0, scale²)`.
/// - `HalfNormal`: support (0, ∞), density `2·N(0, scale²)` on the positive
///   half-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorFamily {
    Normal,
    HalfNormal,
}

/// A single prior: family tag and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorSpec {
    pub family: PriorFamily,
    pub scale: f64,
}

impl PriorSpec {
    pub fn normal(scale: f64) -> Self {
        PriorSpec { family: PriorFamily::Normal, scale }
    }

    pub fn half_normal(scale: f64) -> Self {
        PriorSpec { family: PriorFamily::HalfNormal, scale }
    }

    fn check(&self, name: &'static str, expected: PriorFamily) -> ModelResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ModelError::InvalidPriorScale { name, scale: self.scale });
        }
        if self.family != expected {
            return Err(ModelError::InvalidPriorFamily { name, found: self.family, expected });
        }
        Ok(())
    }

    /// Log-density of the prior at `x`.
    ///
    /// Returns `-∞` outside the support. The scale must already have been
    /// validated; an invalid scale also yields `-∞`.
    pub fn ln_density(&self, x: f64) -> f64 {
        let normal = match Normal::new(0.0, self.scale) {
            Ok(normal) => normal,
            Err(_) => return f64::NEG_INFINITY,
        };
        match self.family {
            PriorFamily::Normal => normal.ln_pdf(x),
            PriorFamily::HalfNormal => {
                if x < 0.0 {
                    f64::NEG_INFINITY
                } else {
                    std::f64::consts::LN_2 + normal.ln_pdf(x)
                }
            }
        }
    }

    /// Derivative of [`PriorSpec::ln_density`] with respect to `x` inside
    /// the support: `-x / scale²` for both families.
    #[inline]
    pub fn grad_ln_density(&self, x: f64) -> f64 {
        -x / (self.scale * self.scale)
    }
}

/// ChangePointPriors — hyperparameters of the single change-point model.
///
/// Fields
/// ------
/// - `mu_before`: [`PriorSpec`]
///   Prior on the mean log-return before the break; must be `Normal`.
/// - `mu_after`: [`PriorSpec`]
///   Prior on the mean log-return from the break onwards; must be `Normal`.
/// - `sigma`: [`PriorSpec`]
///   Prior on the shared volatility; must be `HalfNormal`.
///
/// Invariants
/// ----------
/// - After [`ChangePointPriors::validate`] succeeds, every scale is finite
///   and strictly positive and each family tag matches its parameter's
///   support.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePointPriors {
    pub mu_before: PriorSpec,
    pub mu_after: PriorSpec,
    pub sigma: PriorSpec,
}

impl ChangePointPriors {
    /// Build validated priors from the three scales.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InvalidPriorScale` for a non-finite or non-positive
    ///   scale, naming the offending parameter.
    pub fn new(mu_before_scale: f64, mu_after_scale: f64, sigma_scale: f64) -> ModelResult<Self> {
        let priors = ChangePointPriors {
            mu_before: PriorSpec::normal(mu_before_scale),
            mu_after: PriorSpec::normal(mu_after_scale),
            sigma: PriorSpec::half_normal(sigma_scale),
        };
        priors.validate()?;
        Ok(priors)
    }

    /// Check scales and family tags.
    pub fn validate(&self) -> ModelResult<()> {
        self.mu_before.check("mu_before", PriorFamily::Normal)?;
        self.mu_after.check("mu_after", PriorFamily::Normal)?;
        self.sigma.check("sigma", PriorFamily::HalfNormal)?;
        Ok(())
    }
}

impl Default for ChangePointPriors {
    fn default() -> Self {
        ChangePointPriors {
            mu_before: PriorSpec::normal(DEFAULT_MU_SCALE),
            mu_after: PriorSpec::normal(DEFAULT_MU_SCALE),
            sigma: PriorSpec::half_normal(DEFAULT_SIGMA_SCALE),
        }
    }
}
