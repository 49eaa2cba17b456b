//! brent_changepoint — Bayesian single change-point detection for commodity
//! log-returns, with event association and optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the analysis pipeline to Python via the `_brent_changepoint`
//! extension module. Given daily prices (Brent crude in the motivating use
//! case), the crate locates one structural break in the mean log-return,
//! quantifies its uncertainty and effect size, and names the nearest known
//! market event.
//!
//! Key behaviors
//! -------------
//! - [`series`] cleans raw `(date, price)` rows and derives log-returns.
//! - [`statistical_tests`] runs ADF and KPSS stationarity tests on the
//!   analysed prices and log-returns.
//! - [`changepoint`] declares the model: priors, likelihood, gradient and
//!   the exact conditional of the break index.
//! - [`sampler`] draws from the posterior with parallel hybrid HMC/Gibbs
//!   chains, adapting step size and mass matrix during warm-up.
//! - [`optimization`] finds conditional posterior modes with L-BFGS for
//!   chain initialization.
//! - [`summary`] reduces draws to point estimates, credible intervals,
//!   effect sizes and convergence diagnostics.
//! - [`events`] maps the break date to the nearest calendar entry.
//! - [`pipeline`] composes all of the above and reports failures by stage.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is deterministic for a fixed seed, independent of
//!   the number of worker threads.
//! - Row-level data problems are absorbed by the cleaners; only structural
//!   failures become errors.
//!
//! Conventions
//! -----------
//! - Library code logs through `tracing` and never installs a subscriber;
//!   the `brent_changepoint` binary does that.
//! - Errors are per-module enums converted to `PyErr` at the PyO3 boundary
//!   when `python-bindings` is enabled.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; `tests/` holds end-to-end runs on
//!   synthetic series with a planted break.

pub mod changepoint;
pub mod events;
pub mod optimization;
pub mod pipeline;
pub mod sampler;
pub mod series;
pub mod statistical_tests;
pub mod summary;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    events::EventCalendar,
    pipeline::{AnalysisOutcome, PipelineError, analyze},
    series::PriceSeries,
    utils::{extract_analysis_options, extract_price_rows},
};

/// ChangePointAnalysis — one completed analysis, exposed to Python.
///
/// Purpose
/// -------
/// Run the full pipeline on Python inputs and expose the headline results
/// as read-only properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `ChangePointAnalysis(dates, prices, /, event_dates=None, event_texts=None, ...)`:
/// - `dates`: sequence of date strings in any supported layout.
/// - `prices`: array-like of float64 aligned with `dates`.
/// - `event_dates`, `event_texts`: optional aligned event columns.
/// - Sampler and report keywords mirror [`pipeline::AnalysisOptions`].
///
/// Notes
/// -----
/// - The GIL is released while chains run.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "brent_changepoint.analysis")]
pub struct ChangePointAnalysis {
    inner: AnalysisOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ChangePointAnalysis {
    #[new]
    #[pyo3(
        signature = (
            dates,
            prices,
            event_dates = None,
            event_texts = None,
            draws = None,
            tune = None,
            chains = None,
            seed = None,
            target_accept = None,
            max_divergence_fraction = None,
            tau_step = None,
            tau_radius = None,
            init = None,
            line_search = None,
            ci_level = None,
            report = None,
        ),
        text_signature = "(dates, prices, /, event_dates=None, event_texts=None, draws=2000, \
                          tune=1000, chains=4, seed=42, target_accept=0.95, \
                          max_divergence_fraction=0.05, tau_step='conditional', \
                          tau_radius=None, init='conditional_mode', line_search='more_thuente', \
                          ci_level=0.95, report='point')"
    )]
    pub fn new<'py>(
        py: Python<'py>, dates: Vec<String>, prices: &Bound<'py, PyAny>,
        event_dates: Option<Vec<String>>, event_texts: Option<Vec<String>>, draws: Option<usize>,
        tune: Option<usize>, chains: Option<usize>, seed: Option<u64>,
        target_accept: Option<f64>, max_divergence_fraction: Option<f64>,
        tau_step: Option<&str>, tau_radius: Option<usize>, init: Option<&str>,
        line_search: Option<&str>, ci_level: Option<f64>, report: Option<&str>,
    ) -> PyResult<Self> {
        let opts = extract_analysis_options(
            draws,
            tune,
            chains,
            seed,
            target_accept,
            max_divergence_fraction,
            tau_step,
            tau_radius,
            init,
            line_search,
            ci_level,
            report,
        )?;
        let price_rows = extract_price_rows(py, dates, prices)?;
        let event_rows: Vec<(String, String)> = match (event_dates, event_texts) {
            (Some(d), Some(t)) if d.len() == t.len() => d.into_iter().zip(t).collect(),
            (None, None) => Vec::new(),
            _ => {
                return Err(pyo3::exceptions::PyValueError::new_err(
                    "event_dates and event_texts must both be given with equal lengths",
                ));
            }
        };

        let outcome = py.allow_threads(move || -> Result<AnalysisOutcome, PipelineError> {
            let prices = PriceSeries::from_raw_rows(price_rows)?;
            let events = EventCalendar::from_raw_rows(event_rows);
            analyze(&prices, &events, &opts)
        })?;
        Ok(ChangePointAnalysis { inner: outcome })
    }

    #[getter]
    pub fn change_date(&self) -> String {
        self.inner.impact.change_date.to_string()
    }

    #[getter]
    pub fn tau(&self) -> usize {
        self.inner.impact.tau
    }

    #[getter]
    pub fn tau_interval(&self) -> (usize, usize) {
        (self.inner.impact.tau_low, self.inner.impact.tau_high)
    }

    #[getter]
    pub fn tau_interval_dates(&self) -> (String, String) {
        (self.inner.impact.tau_low_date.to_string(), self.inner.impact.tau_high_date.to_string())
    }

    #[getter]
    pub fn mu_before_mean(&self) -> f64 {
        self.inner.impact.mu_before_mean
    }

    #[getter]
    pub fn mu_after_mean(&self) -> f64 {
        self.inner.impact.mu_after_mean
    }

    #[getter]
    pub fn sigma_mean(&self) -> f64 {
        self.inner.impact.sigma_mean
    }

    /// Percentage change of the mean, or `None` when not computable.
    #[getter]
    pub fn pct_change(&self) -> Option<f64> {
        self.inner.impact.pct_change.value()
    }

    #[getter]
    pub fn nearest_event(&self) -> Option<String> {
        self.inner.impact.nearest_event.clone()
    }

    #[getter]
    pub fn days_to_nearest_event(&self) -> Option<i64> {
        self.inner.impact.days_to_nearest_event
    }

    /// `(parameter, r_hat, ess)` for each model parameter.
    #[getter]
    pub fn diagnostics(&self) -> Vec<(String, Option<f64>, Option<f64>)> {
        self.inner
            .summary
            .diagnostics
            .params
            .iter()
            .map(|d| (d.param.name().to_string(), d.r_hat, d.ess))
            .collect()
    }

    #[getter]
    pub fn total_divergences(&self) -> usize {
        self.inner.summary.diagnostics.total_divergences
    }

    /// Pooled tau draws across chains.
    pub fn tau_draws(&self) -> Vec<usize> {
        self.inner.samples.tau_draws()
    }

    /// The flat impact record as a JSON string.
    pub fn record_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.record)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }
}

/// _brent_changepoint — PyO3 module initializer for the Python extension.
///
/// Registers the `analysis` submodule and inserts it into `sys.modules` so
/// `brent_changepoint.analysis` is importable with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _brent_changepoint<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let analysis_mod = PyModule::new(_py, "analysis")?;
    analysis_mod.add_class::<ChangePointAnalysis>()?;
    m.add_submodule(&analysis_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("brent_changepoint.analysis", analysis_mod)?;
    Ok(())
}
