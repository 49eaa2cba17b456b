//! pipeline::run — compose preprocessing, sampling, summary and events.
//!
//! Purpose
//! -------
//! Run one analysis from cleaned prices to an [`ImpactSummary`], stopping at
//! the first structural failure and reporting its stage.
//!
//! Key behaviors
//! -------------
//! - Options are validated before any data is touched.
//! - The optional date window is applied to prices, so the first return in
//!   the window is computed from two in-window prices.
//! - Event association is advisory and never fails the run.
//!
//! Conventions
//! -----------
//! - Progress is logged with `tracing` at `info`; the sampler logs its own
//!   per-chain detail.
use crate::{
    changepoint::ChangePointModel,
    events::EventCalendar,
    pipeline::{
        errors::PipelineResult,
        options::AnalysisOptions,
        report::{ImpactRecord, ImpactSummary},
    },
    sampler::{CancelToken, PosteriorSampleSet, sample_with_cancel},
    series::{LogReturnSeries, PriceSeries, SeriesStats, describe},
    statistical_tests::StationarityReport,
    summary::PosteriorSummary,
};
use serde::Serialize;
use tracing::{info, warn};

/// Descriptive statistics of the analysed window.
///
/// The stationarity reports are `None` when a test cannot run on the
/// window (too few points, or a flat segment); the analysis continues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub prices: SeriesStats,
    pub log_returns: SeriesStats,
    pub price_stationarity: Option<StationarityReport>,
    pub return_stationarity: Option<StationarityReport>,
}

impl WindowStats {
    fn new(prices: &[f64], log_returns: &[f64]) -> PipelineResult<Self> {
        Ok(WindowStats {
            prices: describe(prices)?,
            log_returns: describe(log_returns)?,
            price_stationarity: stationarity_of("prices", prices),
            return_stationarity: stationarity_of("log_returns", log_returns),
        })
    }
}

fn stationarity_of(series: &str, values: &[f64]) -> Option<StationarityReport> {
    match StationarityReport::run(values) {
        Ok(report) => {
            info!(
                series,
                adf_stat = report.adf.stat(),
                adf_p = report.adf.p_value(),
                adf_lag = report.adf.used_lag(),
                kpss_stat = report.kpss.stat(),
                kpss_p = report.kpss.p_value(),
                "stationarity tests"
            );
            Some(report)
        }
        Err(err) => {
            warn!(series, %err, "stationarity tests skipped");
            None
        }
    }
}

/// Everything an analysis produces.
///
/// `impact` and `record` are the headline results; `summary` and `samples`
/// are kept for callers that want diagnostics or custom reductions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub impact: ImpactSummary,
    pub record: ImpactRecord,
    pub summary: PosteriorSummary,
    pub samples: PosteriorSampleSet,
    pub returns: LogReturnSeries,
    pub stats: WindowStats,
}

/// Analyse cleaned prices against an event calendar.
///
/// Errors
/// ------
/// - `PipelineError::Configuration` for invalid options.
/// - `PipelineError::Preprocess` for a bad window or fewer than two prices.
/// - `PipelineError::Model`, `Sampling` or `Summary` from later stages,
///   including `SamplerError::SamplingDivergence`.
pub fn analyze(
    prices: &PriceSeries, events: &EventCalendar, opts: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome> {
    analyze_with_cancel(prices, events, opts, &CancelToken::new())
}

/// [`analyze`] with a cancellation token forwarded to the sampler.
pub fn analyze_with_cancel(
    prices: &PriceSeries, events: &EventCalendar, opts: &AnalysisOptions, cancel: &CancelToken,
) -> PipelineResult<AnalysisOutcome> {
    opts.validate()?;

    let window = prices.window(opts.start, opts.end)?;
    let returns = window.log_returns()?;
    let stats = WindowStats::new(&window.prices().to_vec(), &returns.values().to_vec())?;
    info!(prices = window.len(), returns = returns.len(), "prepared log-returns");

    let model = ChangePointModel::new(&returns, opts.priors)?;
    let samples = sample_with_cancel(&model, &opts.sampler, cancel)?;
    let summary = PosteriorSummary::from_samples(&samples, &returns, opts.ci_level)?;

    let event = events.nearest(summary.change_date);
    let impact = ImpactSummary::new(&summary, event);
    let record = impact.to_record(opts.report);
    info!(
        change_date = %impact.change_date,
        tau = impact.tau,
        pct_change = %impact.pct_change,
        nearest_event = impact.nearest_event.as_deref().unwrap_or("none"),
        max_r_hat = summary.diagnostics.max_r_hat(),
        "analysis complete"
    );

    Ok(AnalysisOutcome { impact, record, summary, samples, returns, stats })
}

/// [`analyze`] on raw `(date, price)` and `(date, event)` string rows.
///
/// Malformed rows are dropped by the respective cleaners.
pub fn analyze_rows<P, E, D1, V, D2, T>(
    price_rows: P, event_rows: E, opts: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome>
where
    P: IntoIterator<Item = (D1, V)>,
    E: IntoIterator<Item = (D2, T)>,
    D1: AsRef<str>,
    V: AsRef<str>,
    D2: AsRef<str>,
    T: AsRef<str>,
{
    let prices = PriceSeries::from_raw_rows(price_rows)?;
    let events = EventCalendar::from_raw_rows(event_rows);
    analyze(&prices, &events, opts)
}
