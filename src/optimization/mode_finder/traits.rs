//! Public surface of the mode finder.
//!
//! - [`LogDensity`]: trait a model implements to be maximized (and sampled).
//! - [`ModeOptions`] and [`Tolerances`]: solver configuration.
//! - [`LineSearcher`]: line search used inside L-BFGS.
//! - [`OptimOutcome`]: normalized result of [`maximize`](super::maximize).
//!
//! Convention: callers supply a log-density `ℓ(θ)`; the solver minimizes
//! `c(θ) = -ℓ(θ)`. Analytic gradients are gradients of `ℓ`.
use crate::optimization::{
    errors::{OptError, OptResult},
    mode_finder::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log-density over an unconstrained vector `θ`, conditioned on `Data`.
///
/// `Data` carries whatever the density holds fixed while `θ` moves; for
/// the change-point model it is the current break index.
///
/// Required:
/// - `value`: evaluate `ℓ(θ | data)`; invalid inputs are an `OptError`.
/// - `check`: reject an invalid `(θ, data)` pair before any evaluation.
///
/// Optional:
/// - `grad`: analytic `∇ℓ(θ | data)`. Without it the adapter falls back to
///   finite differences; gradient-based samplers require it.
pub trait LogDensity {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used by L-BFGS. Parses case-insensitively from
/// `"MoreThuente"` / `"HagerZhang"`, with or without `_` or `-` separators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String =
            s.chars().filter(|c| !matches!(c, '_' | '-')).collect::<String>().to_lowercase();
        match key.as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Where the solver's gradient comes from.
///
/// `FiniteDifference` ignores any analytic gradient and differentiates the
/// cost numerically, which is useful to cross-check a model's derivatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientSource {
    #[default]
    Analytic,
    FiniteDifference,
}

/// Mode-finder configuration.
///
/// Default
/// -------
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = 1e-10`, `max_iter = 200`
/// - `line_searcher`: `MoreThuente`
/// - `gradient`: `Analytic`
/// - `verbose`: `false` (attaches a slog observer under `obs_slog`)
/// - `lbfgs_mem`: `None` ([`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM))
///
/// Deserializes from a TOML table in which every key is optional, e.g.
/// `[sampler.mode]` in an analysis configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub gradient: GradientSource,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl ModeOptions {
    /// Errors
    /// ------
    /// - Any error from [`ModeOptions::validate`].
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, gradient: GradientSource, verbose: bool,
        lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        let opts = Self { tols, line_searcher, gradient, verbose, lbfgs_mem };
        opts.validate()?;
        Ok(opts)
    }

    /// Check values that may have arrived through deserialization.
    ///
    /// Errors
    /// ------
    /// - Any error from [`Tolerances::new`].
    /// - `OptError::InvalidLBFGSMem` when `lbfgs_mem == Some(0)`.
    pub fn validate(&self) -> OptResult<()> {
        Tolerances::new(self.tols.tol_grad, self.tols.tol_cost, self.tols.max_iter)?;
        if self.lbfgs_mem == Some(0) {
            return Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(())
    }
}

impl Default for ModeOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::default(),
            line_searcher: LineSearcher::default(),
            gradient: GradientSource::default(),
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules. At least one must be present.
///
/// A TOML table that names only some rules keeps the defaults for the
/// others: an absent key means the default rule, not `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_grad: Some(1e-6), tol_cost: Some(1e-10), max_iter: Some(200) }
    }
}

impl Tolerances {
    /// Errors
    /// ------
    /// - `OptError::NoTolerancesProvided` if all three are `None`.
    /// - `OptError::InvalidTolGrad` / `OptError::InvalidTolCost` for a
    ///   non-finite or non-positive tolerance.
    /// - `OptError::InvalidMaxIter` if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a mode search.
///
/// - `theta_hat`: best `θ` found (finite).
/// - `value`: `ℓ(θ̂)`, not the cost.
/// - `converged`: `false` only when Argmin reports `NotTerminated`.
/// - `status`: termination status as text.
/// - `grad_norm`: norm of the last cost gradient, when available.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Errors
    /// ------
    /// - `OptError::MissingThetaHat` / `OptError::InvalidThetaHat` from the
    ///   parameter check.
    /// - `OptError::NonFiniteCost` when `value` is not finite.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
        })
    }
}
