//! summary::posterior — point and interval summaries of the break.
//!
//! Purpose
//! -------
//! Reduce a [`PosteriorSampleSet`] to the quantities reported for an
//! analysis: where the break most plausibly sits, how uncertain that is,
//! and how much the mean return moved.
//!
//! Key behaviors
//! -------------
//! - Tau draws from all chains are pooled. The median and the equal-tailed
//!   credible bounds are rounded to the nearest index and clamped to the
//!   series, then mapped to dates.
//! - Regime means and sigma are plain sample means of the pooled draws.
//! - The effect size is an [`EffectSize`], never a NaN.
//! - Convergence [`Diagnostics`] are attached to every summary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every chain must hold the same number of draws with aligned parameter
//!   vectors; otherwise the set is rejected as ragged.
//! - Tau draws must index into the log-return series the samples came from.
use crate::{
    sampler::{Param, PosteriorSampleSet},
    series::LogReturnSeries,
    summary::{
        diagnostics::Diagnostics,
        effect::EffectSize,
        errors::{SummaryError, SummaryResult},
    },
};
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::{Data, Median, OrderStatistics, Statistics};

/// Default probability mass of the tau credible interval.
pub const DEFAULT_CI_LEVEL: f64 = 0.95;

/// Equal-tailed credible interval for the break index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CredibleInterval {
    pub level: f64,
    pub low: usize,
    pub high: usize,
    pub low_date: NaiveDate,
    pub high_date: NaiveDate,
}

/// PosteriorSummary — reduced view of a change-point posterior.
///
/// Fields
/// ------
/// - `tau_median` / `change_date`: rounded median break index and its date.
/// - `tau_mean`: unrounded mean of the tau draws.
/// - `tau_interval`: credible interval at the requested level.
/// - `mu_before_mean`, `mu_after_mean`, `sigma_mean`: posterior means.
/// - `pct_change`: relative change of the regime mean.
/// - `diagnostics`: R-hat, ESS and per-chain statistics.
/// - `n_draws`: pooled draw count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosteriorSummary {
    pub tau_median: usize,
    pub change_date: NaiveDate,
    pub tau_mean: f64,
    pub tau_interval: CredibleInterval,
    pub mu_before_mean: f64,
    pub mu_after_mean: f64,
    pub sigma_mean: f64,
    pub pct_change: EffectSize,
    pub diagnostics: Diagnostics,
    pub n_draws: usize,
}

impl PosteriorSummary {
    /// Summarize `samples` drawn for `returns`.
    ///
    /// Parameters
    /// ----------
    /// - `samples`: retained draws of every chain.
    /// - `returns`: the series the model was fit on; supplies dates.
    /// - `ci_level`: mass of the tau interval, strictly inside (0, 1).
    ///
    /// Errors
    /// ------
    /// - `SummaryError::InvalidCredibleLevel` for a level outside (0, 1).
    /// - `SummaryError::EmptySamples` with no chains or no draws.
    /// - `SummaryError::RaggedChains` when chain lengths disagree.
    /// - `SummaryError::TauOutOfRange` when a draw indexes past `returns`.
    pub fn from_samples(
        samples: &PosteriorSampleSet, returns: &LogReturnSeries, ci_level: f64,
    ) -> SummaryResult<Self> {
        if !(ci_level > 0.0 && ci_level < 1.0) {
            return Err(SummaryError::InvalidCredibleLevel { value: ci_level });
        }
        validate_shape(samples)?;
        let n = returns.len();
        if let Some(&tau) = samples.tau_draws().iter().find(|&&t| t >= n) {
            return Err(SummaryError::TauOutOfRange { tau, n });
        }

        let mut taus = Data::new(samples.pooled(Param::Tau));
        let tau_median = to_index(taus.median(), n);
        let alpha = 1.0 - ci_level;
        let low = to_index(taus.quantile(alpha / 2.0), n);
        let high = to_index(taus.quantile(1.0 - alpha / 2.0), n);
        let date = |index: usize| {
            returns.date_at(index).ok_or(SummaryError::TauOutOfRange { tau: index, n })
        };

        let mu_before_mean = samples.pooled(Param::MuBefore).mean();
        let mu_after_mean = samples.pooled(Param::MuAfter).mean();

        Ok(PosteriorSummary {
            tau_median,
            change_date: date(tau_median)?,
            tau_mean: samples.pooled(Param::Tau).mean(),
            tau_interval: CredibleInterval {
                level: ci_level,
                low,
                high,
                low_date: date(low)?,
                high_date: date(high)?,
            },
            mu_before_mean,
            mu_after_mean,
            sigma_mean: samples.pooled(Param::Sigma).mean(),
            pct_change: EffectSize::percent_change(mu_before_mean, mu_after_mean),
            diagnostics: Diagnostics::from_samples(samples),
            n_draws: samples.n_chains() * samples.n_draws(),
        })
    }
}

fn validate_shape(samples: &PosteriorSampleSet) -> SummaryResult<()> {
    if samples.n_chains() == 0 || samples.is_empty() {
        return Err(SummaryError::EmptySamples);
    }
    let expected = samples.n_draws();
    for (chain, trace) in samples.chains().iter().enumerate() {
        if trace.len() != expected {
            return Err(SummaryError::RaggedChains { chain, expected, found: trace.len() });
        }
        if !trace.is_aligned() {
            let found = [trace.mu_before.len(), trace.mu_after.len(), trace.sigma.len()]
                .into_iter()
                .find(|&len| len != expected)
                .unwrap_or(expected);
            return Err(SummaryError::RaggedChains { chain, expected, found });
        }
    }
    Ok(())
}

/// Round a real-valued index to the nearest integer inside `[0, n − 1]`.
fn to_index(value: f64, n: usize) -> usize {
    let max = n.saturating_sub(1) as f64;
    value.round().clamp(0.0, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{ChainStats, ChainTrace};
    use approx::assert_relative_eq;
    use ndarray::Array1;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Median, interval and date mapping of pooled tau draws.
    // - Means and the effect-size sentinel.
    // - Rejection of empty, ragged and out-of-range sample sets and of bad
    //   credible levels.
    // -------------------------------------------------------------------------

    fn returns(n: usize) -> LogReturnSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        let dates = (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect();
        LogReturnSeries::new(dates, Array1::zeros(n)).expect("valid series")
    }

    fn stats() -> ChainStats {
        ChainStats {
            mean_accept_prob: 0.9,
            tau_acceptance_rate: 1.0,
            divergences: 0,
            step_size: 0.1,
            inv_mass: vec![1.0; 3],
        }
    }

    fn chain(taus: &[usize], mu_before: f64, mu_after: f64) -> ChainTrace {
        ChainTrace {
            tau: taus.to_vec(),
            mu_before: vec![mu_before; taus.len()],
            mu_after: vec![mu_after; taus.len()],
            sigma: vec![0.01; taus.len()],
            stats: stats(),
        }
    }

    #[test]
    // Purpose
    // -------
    // Pooled tau draws reduce to a median index and its date.
    //
    // Given
    // -----
    // - Two chains whose pooled taus are 4..=13 (median 8.5, rounds to 9
    //   under round-half-away-from-zero).
    //
    // Expect
    // ------
    // - `tau_median == 9`, `change_date` is day 9, the interval sits inside
    //   the draw range, and means follow the constant draws.
    fn summary_reduces_pooled_draws() {
        // Arrange
        let set = PosteriorSampleSet::new(vec![
            chain(&[4, 5, 6, 7, 8], 0.001, 0.002),
            chain(&[9, 10, 11, 12, 13], 0.001, 0.002),
        ]);
        let series = returns(20);

        // Act
        let summary = PosteriorSummary::from_samples(&set, &series, 0.9).expect("valid samples");

        // Assert
        assert_eq!(summary.tau_median, 9);
        assert_eq!(summary.change_date, series.date_at(9).expect("in range"));
        assert_relative_eq!(summary.tau_mean, 8.5);
        assert!(summary.tau_interval.low >= 4 && summary.tau_interval.high <= 13);
        assert!(summary.tau_interval.low <= summary.tau_median);
        assert_eq!(summary.tau_interval.low_date, series.date_at(summary.tau_interval.low).unwrap());
        assert_relative_eq!(summary.mu_before_mean, 0.001);
        assert_relative_eq!(summary.sigma_mean, 0.01);
        assert_relative_eq!(summary.pct_change.value().expect("computable"), 100.0, epsilon = 1e-9);
        assert_eq!(summary.n_draws, 10);
        assert_eq!(summary.diagnostics.chains.len(), 2);
    }

    #[test]
    fn near_zero_baseline_yields_not_computable() {
        let set = PosteriorSampleSet::new(vec![chain(&[3; 4], 1e-9, 0.01), chain(&[3; 4], 1e-9, 0.01)]);

        let summary = PosteriorSummary::from_samples(&set, &returns(10), DEFAULT_CI_LEVEL)
            .expect("valid samples");

        assert_eq!(summary.pct_change, EffectSize::NotComputable);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let series = returns(10);
        let ok = PosteriorSampleSet::new(vec![chain(&[1, 2], 0.0, 0.0), chain(&[1, 2], 0.0, 0.0)]);
        let ragged = PosteriorSampleSet::new(vec![chain(&[1, 2], 0.0, 0.0), chain(&[1], 0.0, 0.0)]);
        let out_of_range = PosteriorSampleSet::new(vec![chain(&[1, 10], 0.0, 0.0)]);

        assert_eq!(
            PosteriorSummary::from_samples(&PosteriorSampleSet::new(vec![]), &series, 0.95)
                .unwrap_err(),
            SummaryError::EmptySamples
        );
        assert_eq!(
            PosteriorSummary::from_samples(&ragged, &series, 0.95).unwrap_err(),
            SummaryError::RaggedChains { chain: 1, expected: 2, found: 1 }
        );
        assert_eq!(
            PosteriorSummary::from_samples(&out_of_range, &series, 0.95).unwrap_err(),
            SummaryError::TauOutOfRange { tau: 10, n: 10 }
        );
        assert_eq!(
            PosteriorSummary::from_samples(&ok, &series, 1.0).unwrap_err(),
            SummaryError::InvalidCredibleLevel { value: 1.0 }
        );
    }

    #[test]
    fn misaligned_parameter_vectors_count_as_ragged() {
        let mut broken = chain(&[1, 2, 3], 0.0, 0.0);
        broken.sigma.pop();
        let set = PosteriorSampleSet::new(vec![chain(&[1, 2, 3], 0.0, 0.0), broken]);

        let err = PosteriorSummary::from_samples(&set, &returns(10), 0.95).unwrap_err();

        assert_eq!(err, SummaryError::RaggedChains { chain: 1, expected: 3, found: 2 });
    }

    #[test]
    fn index_rounding_clamps_to_series() {
        assert_eq!(to_index(2.5, 10), 3);
        assert_eq!(to_index(-0.4, 10), 0);
        assert_eq!(to_index(42.0, 10), 9);
    }
}
