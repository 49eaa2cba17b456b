//! changepoint::model — switching-mean Gaussian model with one break.
//!
//! Purpose
//! -------
//! Bind an observed log-return series to validated priors and expose every
//! density the sampler needs: the joint log-posterior in model space, the
//! unconstrained log-density of the continuous block at fixed `tau` with its
//! analytic gradient, and the full conditional of `tau` given the continuous
//! parameters.
//!
//! Key behaviors
//! -------------
//! - Precompute prefix sums of `y` and `y²` at construction so that, for a
//!   fixed `tau`, the likelihood depends on the data only through six
//!   sufficient statistics. Each continuous-block evaluation is O(1); the
//!   whole `tau` conditional is O(n).
//! - Implement [`LogDensity`] with `Data = usize` (the current `tau`), which
//!   lets both the HMC step and the L-BFGS mode finder consume the model
//!   through one interface.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model is immutable after construction and `Sync`; chains share it by
//!   reference.
//! - Observation `i` belongs to the "before" regime iff `i < tau`; `tau = 0`
//!   therefore places every observation in the "after" regime.
//! - `tau` has a discrete uniform prior on `0..n`, contributing `−ln n`.
//!
//! Conventions
//! -----------
//! - `θ = [mu_before, mu_after, ln sigma]`; the unconstrained density includes
//!   the log-Jacobian `ln sigma` of the `sigma = exp(η)` map.
//! - Constants that do not depend on any parameter are kept in
//!   [`ChangePointModel::log_posterior`] and the unconstrained density, and
//!   dropped from the `tau` conditional kernel.
//!
//! Testing notes
//! -------------
//! - Unit tests compare the prefix-sum likelihood against a direct sum, the
//!   analytic gradient against central finite differences, and check that
//!   the `tau` conditional peaks at a planted break.
use crate::{
    changepoint::{
        errors::{ModelError, ModelResult},
        params::{ChangePointParams, LOG_SIGMA, MU_AFTER, MU_BEFORE, THETA_DIM},
        priors::ChangePointPriors,
    },
    optimization::{
        errors::{OptError, OptResult},
        mode_finder::{Cost, Grad, LogDensity, Theta},
    },
    series::LogReturnSeries,
};
use ndarray::{Array1, array};

/// Lower bound for the data-driven volatility guess used to seed chains.
const MIN_SIGMA_GUESS: f64 = 1e-6;

/// Observations whose range does not exceed this are treated as constant.
pub const MIN_DATA_SPREAD: f64 = 1e-12;

/// Sufficient statistics of the two regimes for a given `tau`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeStats {
    pub n_before: f64,
    pub sum_before: f64,
    pub sumsq_before: f64,
    pub n_after: f64,
    pub sum_after: f64,
    pub sumsq_after: f64,
}

impl RegimeStats {
    /// Residual sum of squares for the given regime means.
    #[inline]
    pub fn sse(&self, mu_before: f64, mu_after: f64) -> f64 {
        let before = self.sumsq_before - 2.0 * mu_before * self.sum_before
            + self.n_before * mu_before * mu_before;
        let after = self.sumsq_after - 2.0 * mu_after * self.sum_after
            + self.n_after * mu_after * mu_after;
        (before + after).max(0.0)
    }
}

/// `ChangePointModel` — priors and likelihood of the single-break model.
///
/// Fields
/// ------
/// - `observed`: `Array1<f64>`
///   Log-returns `y₀ … yₙ₋₁`; finite, non-empty.
/// - `cum_sum`, `cum_sumsq`: `Array1<f64>`
///   Prefix sums of length `n + 1` with `cum_sum[k] = Σ_{i<k} yᵢ`.
/// - `priors`: [`ChangePointPriors`]
///   Validated hyperparameters.
///
/// Notes
/// -----
/// - Two models built from the same series and priors compare equal, which
///   is what makes a run reproducible from its inputs alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePointModel {
    observed: Array1<f64>,
    cum_sum: Array1<f64>,
    cum_sumsq: Array1<f64>,
    priors: ChangePointPriors,
}

impl ChangePointModel {
    /// Build a model over a dated log-return series.
    ///
    /// Errors
    /// ------
    /// - Any error from [`ChangePointModel::from_observed`].
    pub fn new(returns: &LogReturnSeries, priors: ChangePointPriors) -> ModelResult<Self> {
        Self::from_observed(returns.values().clone(), priors)
    }

    /// Build a model over raw observations.
    ///
    /// Errors
    /// ------
    /// - `ModelError::EmptySeries` when `observed` is empty.
    /// - `ModelError::NonFiniteData` for the first NaN/±∞ entry.
    /// - `ModelError::ConstantSeries` when two or more observations span a
    ///   range of at most [`MIN_DATA_SPREAD`] (a flat price window).
    /// - Prior validation errors from [`ChangePointPriors::validate`].
    pub fn from_observed(observed: Array1<f64>, priors: ChangePointPriors) -> ModelResult<Self> {
        if observed.is_empty() {
            return Err(ModelError::EmptySeries);
        }
        if let Some((index, &value)) = observed.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::NonFiniteData { index, value });
        }
        let (lo, hi) = observed
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &y| (lo.min(y), hi.max(y)));
        if observed.len() > 1 && hi - lo <= MIN_DATA_SPREAD {
            return Err(ModelError::ConstantSeries { n: observed.len(), value: observed[0] });
        }
        priors.validate()?;

        let n = observed.len();
        let mut cum_sum = Array1::zeros(n + 1);
        let mut cum_sumsq = Array1::zeros(n + 1);
        for (i, &y) in observed.iter().enumerate() {
            cum_sum[i + 1] = cum_sum[i] + y;
            cum_sumsq[i + 1] = cum_sumsq[i] + y * y;
        }
        Ok(ChangePointModel { observed, cum_sum, cum_sumsq, priors })
    }

    /// Number of observations `n`; `tau` ranges over `0..n`.
    pub fn n_obs(&self) -> usize {
        self.observed.len()
    }

    pub fn observed(&self) -> &Array1<f64> {
        &self.observed
    }

    pub fn priors(&self) -> &ChangePointPriors {
        &self.priors
    }

    /// Sufficient statistics for a break at `tau`.
    ///
    /// The caller guarantees `tau < n`.
    #[inline]
    pub fn regime_stats(&self, tau: usize) -> RegimeStats {
        let n = self.n_obs();
        RegimeStats {
            n_before: tau as f64,
            sum_before: self.cum_sum[tau],
            sumsq_before: self.cum_sumsq[tau],
            n_after: (n - tau) as f64,
            sum_after: self.cum_sum[n] - self.cum_sum[tau],
            sumsq_after: self.cum_sumsq[n] - self.cum_sumsq[tau],
        }
    }

    fn check_tau(&self, tau: usize) -> ModelResult<()> {
        if tau >= self.n_obs() {
            return Err(ModelError::TauOutOfRange { tau, n: self.n_obs() });
        }
        Ok(())
    }

    /// Gaussian log-likelihood of the observed series.
    fn log_likelihood_from_stats(&self, stats: &RegimeStats, mu_before: f64, mu_after: f64, sigma: f64) -> f64 {
        let n = self.n_obs() as f64;
        let sse = stats.sse(mu_before, mu_after);
        -n * sigma.ln() - 0.5 * n * (2.0 * std::f64::consts::PI).ln() - sse / (2.0 * sigma * sigma)
    }

    /// Log-likelihood `ln p(y | tau, mu_before, mu_after, sigma)`.
    ///
    /// Errors
    /// ------
    /// - `ModelError::TauOutOfRange` when `params.tau >= n`.
    pub fn log_likelihood(&self, params: &ChangePointParams) -> ModelResult<f64> {
        self.check_tau(params.tau)?;
        let stats = self.regime_stats(params.tau);
        Ok(self.log_likelihood_from_stats(&stats, params.mu_before, params.mu_after, params.sigma))
    }

    /// Joint log-density `ln p(y, tau, mu_before, mu_after, sigma)` in model
    /// space (no Jacobian term).
    ///
    /// Errors
    /// ------
    /// - `ModelError::TauOutOfRange` when `params.tau >= n`.
    pub fn log_posterior(&self, params: &ChangePointParams) -> ModelResult<f64> {
        let log_lik = self.log_likelihood(params)?;
        let log_prior = self.priors.mu_before.ln_density(params.mu_before)
            + self.priors.mu_after.ln_density(params.mu_after)
            + self.priors.sigma.ln_density(params.sigma)
            - (self.n_obs() as f64).ln();
        Ok(log_lik + log_prior)
    }

    /// Unconstrained log-density of `θ` at fixed `tau`, including the
    /// `ln sigma` Jacobian. May be non-finite for extreme `θ`.
    ///
    /// The caller guarantees `tau < n` and `θ.len() == 3`.
    pub fn log_density_at(&self, tau: usize, theta: &Array1<f64>) -> f64 {
        let (mu_before, mu_after, eta) = (theta[MU_BEFORE], theta[MU_AFTER], theta[LOG_SIGMA]);
        let sigma = eta.exp();
        let stats = self.regime_stats(tau);
        self.log_likelihood_from_stats(&stats, mu_before, mu_after, sigma)
            + self.priors.mu_before.ln_density(mu_before)
            + self.priors.mu_after.ln_density(mu_after)
            + self.priors.sigma.ln_density(sigma)
            + eta
            - (self.n_obs() as f64).ln()
    }

    /// Gradient of [`ChangePointModel::log_density_at`] with respect to `θ`.
    ///
    /// ∂/∂μ₁ = −μ₁/s₁² + (S₁ − n₁μ₁)/σ²,
    /// ∂/∂μ₂ = −μ₂/s₂² + (S₂ − n₂μ₂)/σ²,
    /// ∂/∂η  = −σ²/s_σ² + 1 − n + SSE/σ², with σ = exp(η).
    pub fn grad_log_density_at(&self, tau: usize, theta: &Array1<f64>) -> Array1<f64> {
        let (mu_before, mu_after, eta) = (theta[MU_BEFORE], theta[MU_AFTER], theta[LOG_SIGMA]);
        let sigma = eta.exp();
        let inv_var = (-2.0 * eta).exp();
        let stats = self.regime_stats(tau);
        let sse = stats.sse(mu_before, mu_after);
        let n = self.n_obs() as f64;
        array![
            self.priors.mu_before.grad_ln_density(mu_before)
                + (stats.sum_before - stats.n_before * mu_before) * inv_var,
            self.priors.mu_after.grad_ln_density(mu_after)
                + (stats.sum_after - stats.n_after * mu_after) * inv_var,
            sigma * self.priors.sigma.grad_ln_density(sigma) + 1.0 - n + sse * inv_var,
        ]
    }

    /// Unnormalized log-kernel of `tau` given the continuous parameters:
    /// `−SSE(tau) / (2σ²)`. Terms constant in `tau` are dropped.
    #[inline]
    pub fn tau_log_kernel(&self, tau: usize, mu_before: f64, mu_after: f64, sigma: f64) -> f64 {
        -self.regime_stats(tau).sse(mu_before, mu_after) / (2.0 * sigma * sigma)
    }

    /// Full conditional log-kernel of `tau` for every `tau ∈ 0..n`.
    ///
    /// The entries differ from `ln p(tau | y, μ₁, μ₂, σ)` by a common
    /// additive constant; normalize with log-sum-exp before sampling.
    pub fn tau_log_conditional(&self, mu_before: f64, mu_after: f64, sigma: f64) -> Array1<f64> {
        Array1::from_iter(
            (0..self.n_obs()).map(|tau| self.tau_log_kernel(tau, mu_before, mu_after, sigma)),
        )
    }

    /// Data-driven starting point `[ȳ, ȳ, ln sd(y)]` for the continuous block.
    pub fn initial_theta(&self) -> Array1<f64> {
        let n = self.n_obs() as f64;
        let mean = self.cum_sum[self.n_obs()] / n;
        let var = (self.cum_sumsq[self.n_obs()] / n - mean * mean).max(0.0);
        array![mean, mean, var.sqrt().max(MIN_SIGMA_GUESS).ln()]
    }
}

impl From<ModelError> for OptError {
    fn from(err: ModelError) -> Self {
        OptError::Model(err)
    }
}

impl LogDensity for ChangePointModel {
    /// The change-point index held fixed while `θ` moves.
    type Data = usize;

    fn value(&self, theta: &Theta, tau: &usize) -> OptResult<Cost> {
        let value = self.log_density_at(*tau, theta);
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(value)
    }

    fn check(&self, theta: &Theta, tau: &usize) -> OptResult<()> {
        if theta.len() != THETA_DIM {
            return Err(ModelError::ThetaLengthMismatch {
                expected: THETA_DIM,
                actual: theta.len(),
            }
            .into());
        }
        self.check_tau(*tau)?;
        ChangePointParams::from_theta(*tau, theta)?;
        Ok(())
    }

    fn grad(&self, theta: &Theta, tau: &usize) -> OptResult<Grad> {
        Ok(self.grad_log_density_at(*tau, theta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction failures (empty / non-finite data, invalid priors).
    // - Prefix-sum likelihood vs. a direct per-observation sum.
    // - Analytic gradient vs. central finite differences.
    // - The `tau` conditional peaking at a planted break.
    // - Identical re-instantiation.
    // -------------------------------------------------------------------------

    fn planted_break(n: usize, at: usize, jump: f64) -> Array1<f64> {
        Array1::from_iter((0..n).map(|i| {
            let wiggle = 0.001 * ((i * 7 % 11) as f64 - 5.0);
            if i < at { wiggle } else { jump + wiggle }
        }))
    }

    #[test]
    fn from_observed_rejects_empty_and_non_finite_data() {
        let priors = ChangePointPriors::default();

        assert_eq!(
            ChangePointModel::from_observed(Array1::zeros(0), priors).unwrap_err(),
            ModelError::EmptySeries
        );
        assert!(matches!(
            ChangePointModel::from_observed(array![0.0, f64::INFINITY], priors).unwrap_err(),
            ModelError::NonFiniteData { index: 1, .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // A flat series leaves sigma unidentified and is rejected, while a
    // single observation or a minimal wiggle is still accepted.
    fn from_observed_rejects_constant_series() {
        let priors = ChangePointPriors::default();

        assert_eq!(
            ChangePointModel::from_observed(Array1::zeros(49), priors).unwrap_err(),
            ModelError::ConstantSeries { n: 49, value: 0.0 }
        );
        assert_eq!(
            ChangePointModel::from_observed(array![0.01, 0.01, 0.01], priors).unwrap_err(),
            ModelError::ConstantSeries { n: 3, value: 0.01 }
        );
        assert!(ChangePointModel::from_observed(array![0.0], priors).is_ok());
        assert!(ChangePointModel::from_observed(array![0.0, 0.0, 1e-6], priors).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The sufficient-statistic likelihood equals the textbook per-point sum.
    fn log_likelihood_matches_direct_sum() {
        // Arrange
        let y = planted_break(40, 15, 0.03);
        let model = ChangePointModel::from_observed(y.clone(), ChangePointPriors::default())
            .expect("valid model");
        let params = ChangePointParams::new(15, 0.001, 0.028, 0.012).expect("valid params");

        // Act
        let fast = model.log_likelihood(&params).expect("tau in range");
        let direct: f64 = y
            .iter()
            .enumerate()
            .map(|(i, &yi)| {
                let mu = if i < params.tau { params.mu_before } else { params.mu_after };
                -0.5 * (2.0 * std::f64::consts::PI).ln()
                    - params.sigma.ln()
                    - (yi - mu).powi(2) / (2.0 * params.sigma.powi(2))
            })
            .sum();

        // Assert
        assert_relative_eq!(fast, direct, max_relative = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient agrees with central differences at a generic
    // point and for both boundary values of tau.
    fn gradient_matches_central_differences() {
        let y = planted_break(60, 20, -0.02);
        let model =
            ChangePointModel::from_observed(y, ChangePointPriors::default()).expect("valid model");
        let theta = array![0.002, -0.018, (0.011_f64).ln()];
        let h = 1e-6;

        for tau in [0usize, 20, 59] {
            let grad = model.grad_log_density_at(tau, &theta);
            for k in 0..THETA_DIM {
                let mut up = theta.clone();
                let mut down = theta.clone();
                up[k] += h;
                down[k] -= h;
                let fd = (model.log_density_at(tau, &up) - model.log_density_at(tau, &down))
                    / (2.0 * h);
                assert_relative_eq!(grad[k], fd, max_relative = 1e-4, epsilon = 1e-3);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Given the true regime means, the tau conditional is maximized at the
    // planted break.
    fn tau_conditional_peaks_at_planted_break() {
        let y = planted_break(120, 70, 0.05);
        let model =
            ChangePointModel::from_observed(y, ChangePointPriors::default()).expect("valid model");

        let kernel = model.tau_log_conditional(0.0, 0.05, 0.01);
        let argmax = kernel
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0;

        assert_eq!(kernel.len(), 120);
        assert_eq!(argmax, 70);
    }

    #[test]
    // Purpose
    // -------
    // The unconstrained density equals the model-space posterior plus the
    // log-Jacobian ln sigma.
    fn unconstrained_density_adds_log_jacobian() {
        let model = ChangePointModel::from_observed(planted_break(30, 10, 0.01), ChangePointPriors::default())
            .expect("valid model");
        let params = ChangePointParams::new(10, 0.0005, 0.0101, 0.02).expect("valid params");

        let unconstrained = model.log_density_at(params.tau, &params.theta());
        let model_space = model.log_posterior(&params).expect("tau in range");

        assert_relative_eq!(unconstrained, model_space + params.sigma.ln(), max_relative = 1e-12);
    }

    #[test]
    fn identical_inputs_build_equal_models() {
        let y = planted_break(25, 5, 0.02);
        let priors = ChangePointPriors::new(0.02, 0.02, 0.01).expect("valid priors");

        let a = ChangePointModel::from_observed(y.clone(), priors).expect("valid");
        let b = ChangePointModel::from_observed(y, priors).expect("valid");

        assert_eq!(a, b);
    }

    #[test]
    fn log_density_trait_rejects_out_of_range_tau() {
        let model = ChangePointModel::from_observed(planted_break(10, 5, 0.01), ChangePointPriors::default())
            .expect("valid model");

        let err = model.check(&model.initial_theta(), &10).unwrap_err();

        assert_eq!(err, OptError::Model(ModelError::TauOutOfRange { tau: 10, n: 10 }));
    }
}
