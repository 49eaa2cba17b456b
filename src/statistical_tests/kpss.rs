//! statistical_tests::kpss — KPSS test for level stationarity.
//!
//! Purpose
//! -------
//! Test the null hypothesis that a series is stationary around a constant
//! level, the complement of the ADF null. Reading both together separates
//! "clearly stationary" from "clearly integrated" from "inconclusive".
//!
//! Key behaviors
//! -------------
//! - Residuals are deviations from the sample mean; the statistic is
//!   η = Σₜ Sₜ² / (n²·σ̂²) with Sₜ the partial sums of the residuals.
//! - σ̂² is the Newey–West long-run variance with a Bartlett kernel.
//! - The bandwidth is chosen by the Hobijn–Franses–Ooms (2004) rule unless
//!   the caller fixes it.
//! - The p-value interpolates the Kwiatkowski et al. (1992) table and is
//!   clipped to [0.01, 0.10]; values at the ends mean "at most" or "at
//!   least".
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is validated by [`validate_series`]: at least [`KPSS_MIN_OBS`]
//!   finite observations that are not all equal.
//! - The bandwidth is always below n.
use crate::statistical_tests::{
    errors::{StatTestError, StatTestResult},
    validation::validate_series,
};
use serde::Serialize;

/// Smallest sample with a defined lag-1 autocovariance.
pub const KPSS_MIN_OBS: usize = 2;

/// Asymptotic critical values for the level-stationary case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpssCriticalValues {
    pub ten_pct: f64,
    pub five_pct: f64,
    pub two_half_pct: f64,
    pub one_pct: f64,
}

pub const KPSS_CRITICAL_VALUES: KpssCriticalValues =
    KpssCriticalValues { ten_pct: 0.347, five_pct: 0.463, two_half_pct: 0.574, one_pct: 0.739 };

/// KpssOutcome — result of one KPSS test.
///
/// Fields
/// ------
/// - `stat`: the η statistic.
/// - `p_value`: interpolated p-value in [0.01, 0.10].
/// - `lags`: Bartlett bandwidth used for σ̂².
///
/// Invariants
/// ----------
/// - Large `stat` and small `p_value` are evidence against stationarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpssOutcome {
    stat: f64,
    p_value: f64,
    lags: usize,
    critical_values: KpssCriticalValues,
}

impl KpssOutcome {
    /// Run the KPSS test around a constant.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `&[f64]`
    ///   Series in time order.
    /// - `lags`: `Option<usize>`
    ///   Bartlett bandwidth. `None` applies the automatic rule, capped at
    ///   n − 1.
    ///
    /// Errors
    /// ------
    /// - Validation errors from [`validate_series`].
    /// - `StatTestError::InvalidLags` when an explicit `lags ≥ n`.
    pub fn kpss(data: &[f64], lags: Option<usize>) -> StatTestResult<Self> {
        validate_series(data, KPSS_MIN_OBS)?;
        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let resid: Vec<f64> = data.iter().map(|y| y - mean).collect();

        let lags = match lags {
            Some(lags) if lags >= n => return Err(StatTestError::InvalidLags { lags, n }),
            Some(lags) => lags,
            None => auto_lags(&resid).min(n - 1),
        };

        let eta = resid
            .iter()
            .scan(0.0, |partial, e| {
                *partial += e;
                Some(*partial * *partial)
            })
            .sum::<f64>()
            / (n as f64).powi(2);
        let stat = eta / long_run_variance(&resid, lags);

        Ok(KpssOutcome {
            stat,
            p_value: interpolate_p_value(stat),
            lags,
            critical_values: KPSS_CRITICAL_VALUES,
        })
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }

    /// Interpolated p-value, clipped to [0.01, 0.10].
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn critical_values(&self) -> KpssCriticalValues {
        self.critical_values
    }
}

/// Σₜ eₜ·eₜ₋ⱼ.
#[inline]
fn lagged_product(resid: &[f64], j: usize) -> f64 {
    resid[j..].iter().zip(resid).map(|(a, b)| a * b).sum()
}

/// Newey–West long-run variance with Bartlett weights 1 − j/(lags + 1).
fn long_run_variance(resid: &[f64], lags: usize) -> f64 {
    let n = resid.len() as f64;
    let weight = |j: usize| 1.0 - j as f64 / (lags as f64 + 1.0);
    let sum = (1..=lags).fold(lagged_product(resid, 0), |acc, j| {
        acc + 2.0 * weight(j) * lagged_product(resid, j)
    });
    sum / n
}

/// Hobijn–Franses–Ooms automatic bandwidth.
///
/// Pilot autocovariances up to ⌊n^{2/9}⌋ give γ̂ = 1.1447·(s₁/s₀)^{2/3};
/// the bandwidth is ⌊γ̂·n^{1/3}⌋.
fn auto_lags(resid: &[f64]) -> usize {
    let n = resid.len();
    let nf = n as f64;
    let pilot = nf.powf(2.0 / 9.0) as usize;
    let mut s0 = lagged_product(resid, 0) / nf;
    let mut s1 = 0.0;
    for i in 1..=pilot.min(n - 1) {
        let cov = lagged_product(resid, i) / (nf / 2.0);
        s0 += cov;
        s1 += i as f64 * cov;
    }
    let ratio = s1 / s0;
    let gamma = 1.1447 * (ratio * ratio).powf(1.0 / 3.0);
    let lags = gamma * nf.powf(1.0 / 3.0);
    if lags.is_finite() && lags > 0.0 { lags as usize } else { 0 }
}

/// Piecewise-linear p-value from the critical-value table.
fn interpolate_p_value(stat: f64) -> f64 {
    let cv = KPSS_CRITICAL_VALUES;
    let table = [
        (cv.ten_pct, 0.10),
        (cv.five_pct, 0.05),
        (cv.two_half_pct, 0.025),
        (cv.one_pct, 0.01),
    ];
    if stat <= table[0].0 {
        return table[0].1;
    }
    for pair in table.windows(2) {
        let ((x0, p0), (x1, p1)) = (pair[0], pair[1]);
        if stat <= x1 {
            return p0 + (p1 - p0) * (stat - x0) / (x1 - x0);
        }
    }
    table[3].1
}
