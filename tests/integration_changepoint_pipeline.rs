//! Integration tests for change-point inference on synthetic series.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from raw price rows, through the model and
//!   the multi-chain sampler, to the posterior summary and event match.
//! - Check statistical behavior on series with a planted break rather than
//!   on hand-built traces.
//!
//! Coverage
//! --------
//! - `changepoint` + `sampler`: recovery of a planted break, determinism for
//!   a fixed seed, every tau update kind, and the divergence stop.
//! - `summary`: R-hat near one on a well-identified posterior.
//! - `sampler` + `optimization`: conditional-mode settings reaching chain
//!   initialization.
//! - `pipeline`: CSV-like rows in, flat record out, with event association
//!   and stationarity tests on the window; flat price windows rejected in
//!   the model stage.
//!
//! Exclusions
//! ----------
//! - Kernel-level checks (leapfrog moments, conditional tau frequencies,
//!   dual averaging); those are covered by unit tests.
//! - Python bindings.
use brent_changepoint::{
    changepoint::{ChangePointModel, ChangePointPriors, ModelError},
    optimization::mode_finder::{GradientSource, LineSearcher, ModeOptions, Tolerances},
    pipeline::{AnalysisOptions, PipelineError, ReportMode, analyze_rows},
    sampler::{InitStrategy, Param, SamplerError, SamplerOptions, TauStep, sample},
    series::LogReturnSeries,
    summary::PosteriorSummary,
};
use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use ndarray::Array1;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Purpose
/// -------
/// Draw a dated log-return series with a mean shift at index `break_at`.
///
/// Parameters
/// ----------
/// - `n`: series length.
/// - `break_at`: first index of the second regime.
/// - `mu_after`: mean of the second regime; the first has mean 0.
/// - `seed`: data seed, independent of the sampler seed.
///
/// Returns
/// -------
/// A [`LogReturnSeries`] with noise sd 0.01 dated on consecutive days from
/// 2019-01-01.
fn synthetic_returns(n: usize, break_at: usize, mu_after: f64, seed: u64) -> LogReturnSeries {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.01).expect("valid normal");
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let mean = if i < break_at { 0.0 } else { mu_after };
            mean + noise.sample(&mut rng)
        })
        .collect();
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date");
    let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();
    LogReturnSeries::new(dates, Array1::from(values)).expect("valid synthetic series")
}

/// Rebuild price rows whose log-returns equal `returns`, starting at 70.
fn price_rows(returns: &LogReturnSeries) -> Vec<(String, String)> {
    let first = returns.dates()[0] - Duration::days(1);
    let mut price = 70.0_f64;
    let mut rows = vec![(first.to_string(), price.to_string())];
    for (date, r) in returns.iter() {
        price *= r.exp();
        rows.push((date.to_string(), price.to_string()));
    }
    rows
}

fn quick_sampler() -> SamplerOptions {
    SamplerOptions::default().with_draws(400).with_tune(400)
}

#[test]
// Purpose
// -------
// The posterior median of tau lands near a planted break.
//
// Given
// -----
// - Five independent 200-point series: N(0, 0.01) then N(0.05, 0.01) from
//   index 100.
//
// Expect
// ------
// - For every series, |median tau − 100| ≤ 10 and the regime means sit near
//   0 and 0.05.
fn planted_break_is_recovered() {
    for data_seed in 0..5 {
        // Arrange
        let returns = synthetic_returns(200, 100, 0.05, data_seed);
        let model = ChangePointModel::new(&returns, ChangePointPriors::default())
            .expect("valid model");

        // Act
        let samples = sample(&model, &quick_sampler()).expect("sampling succeeds");
        let summary =
            PosteriorSummary::from_samples(&samples, &returns, 0.95).expect("valid samples");

        // Assert
        assert!(
            summary.tau_median.abs_diff(100) <= 10,
            "seed {data_seed}: tau median {}",
            summary.tau_median
        );
        assert!(summary.mu_before_mean.abs() < 0.01, "seed {data_seed}");
        assert!((summary.mu_after_mean - 0.05).abs() < 0.01, "seed {data_seed}");
        assert!(summary.tau_interval.low <= summary.tau_median);
        assert!(summary.tau_median <= summary.tau_interval.high);
    }
}

#[test]
// Purpose
// -------
// A fixed seed, configuration and input reproduce the run exactly.
fn fixed_seed_reproduces_samples_exactly() {
    // Arrange
    let returns = synthetic_returns(120, 60, 0.03, 11);
    let model = ChangePointModel::new(&returns, ChangePointPriors::default()).expect("valid model");
    let opts = quick_sampler().with_draws(200).with_tune(200).with_seed(7);

    // Act
    let first = sample(&model, &opts).expect("first run");
    let second = sample(&model, &opts).expect("second run");
    let other_seed = sample(&model, &opts.with_seed(8)).expect("third run");

    // Assert
    assert_eq!(first, second);
    assert_ne!(first, other_seed);
}

#[test]
// Purpose
// -------
// All tau update kinds and both initializations find the same break on a
// clearly separated series.
fn every_tau_step_recovers_the_break() {
    let returns = synthetic_returns(150, 50, -0.04, 3);
    let model = ChangePointModel::new(&returns, ChangePointPriors::default()).expect("valid model");
    let variants = [
        (TauStep::Conditional, InitStrategy::ConditionalMode),
        (TauStep::Uniform, InitStrategy::ConditionalMode),
        (TauStep::Local { radius: 15 }, InitStrategy::Prior),
    ];

    for (tau_step, init) in variants {
        let opts = quick_sampler().with_tau_step(tau_step).with_init(init);

        let samples = sample(&model, &opts).expect("sampling succeeds");
        let summary =
            PosteriorSummary::from_samples(&samples, &returns, 0.95).expect("valid samples");

        assert!(
            summary.tau_median.abs_diff(50) <= 5,
            "{tau_step:?}/{init:?}: tau median {}",
            summary.tau_median
        );
    }
}

#[test]
// Purpose
// -------
// Conditional-mode settings configured on the sampler are the ones chain
// initialization runs with.
//
// Given
// -----
// - Hager-Zhang with a finite-difference gradient, a one-iteration search,
//   and a zero-length history, each on the same series and seed.
//
// Expect
// ------
// - The Hager-Zhang run recovers the break.
// - Truncating the search changes the chains' starting points, hence the
//   draws.
// - The invalid history is rejected before any chain runs.
fn configured_mode_search_runs_inside_sample() {
    // Arrange
    let returns = synthetic_returns(150, 60, 0.04, 9);
    let model = ChangePointModel::new(&returns, ChangePointPriors::default()).expect("valid model");
    let base =
        quick_sampler().with_draws(200).with_tune(200).with_init(InitStrategy::ConditionalMode);
    let hager_zhang = ModeOptions {
        line_searcher: LineSearcher::HagerZhang,
        gradient: GradientSource::FiniteDifference,
        ..ModeOptions::default()
    };
    let truncated = ModeOptions {
        tols: Tolerances { tol_grad: None, tol_cost: None, max_iter: Some(1) },
        ..ModeOptions::default()
    };
    let no_history = ModeOptions { lbfgs_mem: Some(0), ..ModeOptions::default() };

    // Act
    let hz = sample(&model, &base.with_mode(hager_zhang)).expect("sampling succeeds");
    let full = sample(&model, &base).expect("sampling succeeds");
    let short = sample(&model, &base.with_mode(truncated)).expect("sampling succeeds");
    let err = sample(&model, &base.with_mode(no_history)).unwrap_err();

    // Assert
    let summary = PosteriorSummary::from_samples(&hz, &returns, 0.95).expect("valid samples");
    assert!(summary.tau_median.abs_diff(60) <= 5, "tau median {}", summary.tau_median);
    assert_ne!(full, short);
    assert!(matches!(err, SamplerError::InvalidModeOptions(_)), "got {err:?}");
}

#[test]
// Purpose
// -------
// A window of unchanged prices is refused instead of producing a break.
fn flat_price_window_is_a_model_error() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    let rows: Vec<(String, String)> = (0..50)
        .map(|i| ((start + Duration::days(i)).to_string(), "100".to_string()))
        .collect();
    let mut opts = AnalysisOptions::default();
    opts.sampler = quick_sampler();

    let err = analyze_rows(rows, Vec::<(&str, &str)>::new(), &opts).unwrap_err();

    assert_eq!(err, PipelineError::Model(ModelError::ConstantSeries { n: 49, value: 0.0 }));
}

#[test]
// Purpose
// -------
// Chains on a well-identified posterior agree.
//
// Expect
// ------
// - Split R-hat below 1.05 for the regime means and sigma.
// - Adapted step sizes keep the continuous block's acceptance high.
fn well_mixed_chains_have_rhat_near_one() {
    // Arrange
    let returns = synthetic_returns(200, 100, 0.05, 21);
    let model = ChangePointModel::new(&returns, ChangePointPriors::default()).expect("valid model");

    // Act
    let samples = sample(&model, &quick_sampler()).expect("sampling succeeds");
    let summary = PosteriorSummary::from_samples(&samples, &returns, 0.95).expect("valid samples");

    // Assert
    for param in [Param::MuBefore, Param::MuAfter, Param::Sigma] {
        let diag = summary.diagnostics.get(param).expect("diagnosed");
        let r_hat = diag.r_hat.expect("defined for continuous parameters");
        assert!(r_hat < 1.05, "{}: r_hat = {r_hat}", param.name());
        assert!(diag.ess.expect("defined") > 100.0, "{}", param.name());
    }
    assert_eq!(summary.diagnostics.chains.len(), 4);
    for chain in &summary.diagnostics.chains {
        assert!(chain.mean_accept_prob > 0.6, "accept = {}", chain.mean_accept_prob);
    }
}

#[test]
// Purpose
// -------
// An absurd fixed step size with no warm-up and no tolerance stops the run
// with the failing chain and draw index.
fn excessive_divergences_fail_the_run() {
    // Arrange
    let returns = synthetic_returns(100, 50, 0.02, 5);
    let model = ChangePointModel::new(&returns, ChangePointPriors::default()).expect("valid model");
    let mut opts = SamplerOptions::default().with_draws(50).with_tune(0);
    opts.initial_step_size = Some(50.0);
    opts.max_divergence_fraction = 0.0;

    // Act
    let err = sample(&model, &opts).unwrap_err();

    // Assert
    assert_eq!(
        err,
        SamplerError::SamplingDivergence { chain: 0, iteration: 0, divergences: 1, draws: 50 }
    );
}

#[test]
// Purpose
// -------
// Raw rows in, flat record out, with the nearest event attached.
//
// Given
// -----
// - Prices rebuilt from a series with a break at return index 100
//   (2019-04-11), one malformed row, and three events.
//
// Expect
// ------
// - The change date lies within ten days of 2019-04-11.
// - The nearest event is the April entry; Range mode fills interval dates.
// - KPSS rejects level stationarity of the drifting prices.
fn pipeline_links_break_to_nearest_event() {
    // Arrange
    let returns = synthetic_returns(200, 100, 0.05, 42);
    let mut rows = price_rows(&returns);
    rows.push(("not-a-date".to_string(), "71.0".to_string()));
    let events = [
        ("2019-01-15", "Early event"),
        ("2019-04-12", "Supply disruption"),
        ("2019-07-01", "Late event"),
    ];
    let mut opts = AnalysisOptions::default();
    opts.sampler = quick_sampler();
    opts.report = ReportMode::Range;
    let planted = NaiveDate::from_ymd_opt(2019, 4, 11).expect("valid date");

    // Act
    let outcome = analyze_rows(rows, events, &opts).expect("analysis succeeds");

    // Assert
    let offset = (outcome.impact.change_date - planted).num_days().abs();
    assert!(offset <= 10, "change date {}", outcome.impact.change_date);
    assert_eq!(outcome.record.nearest_event.as_deref(), Some("Supply disruption"));
    assert!(outcome.record.days_to_nearest_event.expect("event found") <= 11);
    assert!(outcome.record.tau_low.is_some());
    assert!(outcome.record.pct_change.is_some() || outcome.impact.mu_before_mean.abs() <= 1e-8);
    assert_eq!(outcome.returns.len(), 200);
    let price_tests = outcome.stats.price_stationarity.expect("prices long enough to test");
    assert_relative_eq!(price_tests.kpss.p_value(), 0.01);
    assert!(!price_tests.is_stationary(0.05));
    assert!(outcome.stats.return_stationarity.is_some());
}
