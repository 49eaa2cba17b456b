//! statistical_tests::adf — augmented Dickey–Fuller unit-root test.
//!
//! Purpose
//! -------
//! Test the null hypothesis that a series has a unit root against the
//! alternative of level stationarity. Applied to prices and log-returns
//! during the exploratory step of an analysis: prices are expected to keep
//! the null, log-returns to reject it.
//!
//! Key behaviors
//! -------------
//! - Regress Δyₜ on yₜ₋₁, p lagged differences Δyₜ₋₁ … Δyₜ₋ₚ and a
//!   constant. The statistic is the t-ratio of the yₜ₋₁ coefficient.
//! - Choose p ∈ {0, …, maxlag} by minimum AIC, with every candidate fitted on
//!   the common sample that the largest lag allows. The chosen model is then
//!   refitted on its own, longer sample.
//! - The default lag bound is Schwert's rule ⌈12·(n/100)^{1/4}⌉, capped at
//!   n/2 − 2.
//! - p-values use MacKinnon's (1994) response-surface approximation and
//!   critical values MacKinnon's (2010) finite-sample surface, both for the
//!   constant-only case.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is validated by [`validate_series`]: at least
//!   [`ADF_MIN_OBS`] finite observations that are not all equal.
//! - The auxiliary regression always keeps at least one residual degree of
//!   freedom because the lag bound never exceeds n/2 − 2.
//!
//! Conventions
//! -----------
//! - Linear algebra is done with `nalgebra`; the design matrix is small
//!   (maxlag + 2 columns), so the normal equations are inverted directly.
//! - AIC is −2·ℓ + 2k with the Gaussian log-likelihood
//!   ℓ = −m/2·(ln 2π + ln(SSR/m) + 1) over the m regression rows.
//!
//! Testing notes
//! -------------
//! - Reference values for a fixed pseudo-random series were computed with an
//!   independent implementation of the same regression.
//! - Behavioral tests check that white noise rejects the unit root and a
//!   random walk does not, and that the lag bounds are enforced.
use crate::statistical_tests::{
    errors::{StatTestError, StatTestResult},
    validation::validate_series,
};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Smallest sample for which the lag bound n/2 − 2 is non-negative.
pub const ADF_MIN_OBS: usize = 4;

/// MacKinnon (2010) critical values for the constant-only regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdfCriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl AdfCriticalValues {
    /// Evaluate the response surface at `nobs` regression rows.
    pub fn for_nobs(nobs: usize) -> Self {
        let inv = 1.0 / nobs as f64;
        let surface = |c: [f64; 4]| c[0] + inv * (c[1] + inv * (c[2] + inv * c[3]));
        AdfCriticalValues {
            one_pct: surface([-3.43035, -6.5393, -16.786, -79.433]),
            five_pct: surface([-2.86154, -2.8903, -4.234, -40.040]),
            ten_pct: surface([-2.56677, -1.5384, -2.809, 0.0]),
        }
    }
}

/// AdfOutcome — result of one augmented Dickey–Fuller test.
///
/// Fields
/// ------
/// - `stat`: t-ratio of the lagged level coefficient.
/// - `p_value`: MacKinnon approximate p-value, in [0, 1].
/// - `used_lag`: number of lagged differences chosen by AIC.
/// - `max_lag`: upper bound of the lag search.
/// - `nobs`: rows of the final regression, n − 1 − `used_lag`.
/// - `aic`: AIC of the chosen model on the common search sample.
/// - `critical_values`: 1%, 5% and 10% critical values for `nobs`.
///
/// Invariants
/// ----------
/// - `used_lag ≤ max_lag ≤ n/2 − 2`.
/// - Small `p_value` is evidence against a unit root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdfOutcome {
    stat: f64,
    p_value: f64,
    used_lag: usize,
    max_lag: usize,
    nobs: usize,
    aic: f64,
    critical_values: AdfCriticalValues,
}

impl AdfOutcome {
    /// Run the ADF test with AIC lag selection.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Series in time order.
    /// - `maxlag`: `Option<usize>`
    ///   Upper bound for the lag search. `None` uses Schwert's rule capped
    ///   at n/2 − 2.
    ///
    /// Errors
    /// ------
    /// - Validation errors from [`validate_series`].
    /// - `StatTestError::InvalidMaxLag` when `maxlag > n/2 − 2`.
    /// - `StatTestError::SingularRegression` when a candidate regression
    ///   cannot be inverted or the chosen one leaves no residual variance.
    pub fn adfuller(data: &[f64], maxlag: Option<usize>) -> StatTestResult<Self> {
        validate_series(data, ADF_MIN_OBS)?;
        let n = data.len();
        let limit = n / 2 - 2;
        let max_lag = match maxlag {
            Some(maxlag) if maxlag > limit => {
                return Err(StatTestError::InvalidMaxLag { maxlag, limit });
            }
            Some(maxlag) => maxlag,
            None => schwert_max_lag(n).min(limit),
        };

        let diffs: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
        let (aic, used_lag) = select_lag(data, &diffs, max_lag)?;
        let fit = fit_regression(data, &diffs, used_lag, used_lag)?;
        let se = (fit.sigma2() * fit.level_var_factor).sqrt();
        if !(se.is_finite() && se > 0.0) {
            return Err(StatTestError::SingularRegression { lags: used_lag });
        }
        let stat = fit.level_coef / se;

        Ok(AdfOutcome {
            stat,
            p_value: mackinnon_p_value(stat),
            used_lag,
            max_lag,
            nobs: fit.nobs,
            aic,
            critical_values: AdfCriticalValues::for_nobs(fit.nobs),
        })
    }

    /// t-ratio of the lagged level coefficient.
    pub fn stat(&self) -> f64 {
        self.stat
    }

    /// Approximate p-value of [`stat`](Self::stat).
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Lagged differences in the chosen regression.
    pub fn used_lag(&self) -> usize {
        self.used_lag
    }

    /// Upper bound of the lag search.
    pub fn max_lag(&self) -> usize {
        self.max_lag
    }

    /// Rows of the final regression.
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// AIC of the chosen model on the common search sample.
    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn critical_values(&self) -> AdfCriticalValues {
        self.critical_values
    }
}

//
// ---------- Private helpers ----------
//

/// Schwert's lag rule ⌈12·(n/100)^{1/4}⌉.
#[inline]
fn schwert_max_lag(n: usize) -> usize {
    (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Sufficient statistics of one auxiliary regression.
#[derive(Debug, Clone, Copy)]
struct RegressionFit {
    nobs: usize,
    regressors: usize,
    ssr: f64,
    level_coef: f64,
    /// Diagonal entry of (X'X)⁻¹ for the lagged level.
    level_var_factor: f64,
}

impl RegressionFit {
    fn sigma2(&self) -> f64 {
        self.ssr / (self.nobs - self.regressors) as f64
    }

    fn aic(&self) -> f64 {
        let m = self.nobs as f64;
        let llf = -0.5 * m * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / m).ln() + 1.0);
        -2.0 * llf + 2.0 * self.regressors as f64
    }
}

/// Fit Δyₜ = β·yₜ₋₁ + Σⱼ γⱼ·Δyₜ₋ⱼ + c for t over `diffs[first..]`.
///
/// `levels[t]` is the level preceding `diffs[t]`. Requires `first ≥ lags`.
fn fit_regression(
    levels: &[f64], diffs: &[f64], first: usize, lags: usize,
) -> StatTestResult<RegressionFit> {
    let singular = || StatTestError::SingularRegression { lags };
    let nobs = diffs.len() - first;
    let regressors = lags + 2;
    if nobs <= regressors {
        return Err(singular());
    }

    let mut x = DMatrix::<f64>::zeros(nobs, regressors);
    let mut y = DVector::<f64>::zeros(nobs);
    for (row, t) in (first..diffs.len()).enumerate() {
        y[row] = diffs[t];
        x[(row, 0)] = levels[t];
        for j in 1..=lags {
            x[(row, j)] = diffs[t - j];
        }
        x[(row, regressors - 1)] = 1.0;
    }

    let xt = x.transpose();
    let xtx_inv = (&xt * &x).try_inverse().ok_or_else(singular)?;
    let beta = &xtx_inv * (&xt * &y);
    let ssr = (&y - &x * &beta).norm_squared();

    Ok(RegressionFit {
        nobs,
        regressors,
        ssr,
        level_coef: beta[0],
        level_var_factor: xtx_inv[(0, 0)],
    })
}

/// Minimum-AIC lag on the sample common to all candidates.
///
/// Ties keep the smaller lag.
fn select_lag(levels: &[f64], diffs: &[f64], max_lag: usize) -> StatTestResult<(f64, usize)> {
    let mut best = (f64::INFINITY, 0);
    for lags in 0..=max_lag {
        let aic = fit_regression(levels, diffs, max_lag, lags)?.aic();
        if aic < best.0 {
            best = (aic, lags);
        }
    }
    Ok(best)
}

/// MacKinnon (1994) approximate p-value, one variable, constant only.
fn mackinnon_p_value(stat: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    if stat > TAU_MAX {
        return 1.0;
    }
    if stat < TAU_MIN {
        return 0.0;
    }
    let z = if stat <= TAU_STAR {
        2.1659 + stat * (1.4412 + stat * 0.038269)
    } else {
        1.7339 + stat * (0.93202 + stat * (-0.12745 + stat * -0.010368))
    };
    Normal::standard().cdf(z)
}
