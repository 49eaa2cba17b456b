//! Conversion helpers for the Python binding surface.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::mode_finder::LineSearcher,
    pipeline::{AnalysisOptions, ReportMode},
    sampler::{InitStrategy, SamplerOptions, TauStep},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a 1-D float64 ndarray, a pandas Series or any float sequence.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Pair date strings with prices rendered for the row cleaner.
///
/// Non-finite prices become `"NaN"` and are dropped by cleaning like any
/// other malformed row.
#[cfg(feature = "python-bindings")]
pub fn extract_price_rows<'py>(
    py: Python<'py>, dates: Vec<String>, prices: &Bound<'py, PyAny>,
) -> PyResult<Vec<(String, String)>> {
    let arr = extract_f64_array(py, prices)?;
    let values = arr.as_slice().map_err(|_| {
        PyValueError::new_err("prices must be a 1-D contiguous float64 array or sequence")
    })?;
    if values.len() != dates.len() {
        return Err(PyValueError::new_err(format!(
            "got {} dates but {} prices; lengths must match",
            dates.len(),
            values.len()
        )));
    }
    Ok(dates.into_iter().zip(values.iter().map(|v| v.to_string())).collect())
}

#[cfg(feature = "python-bindings")]
fn extract_tau_step(tau_step: Option<&str>, tau_radius: Option<usize>) -> PyResult<TauStep> {
    match tau_step.unwrap_or("conditional").to_lowercase().as_str() {
        "conditional" => Ok(TauStep::Conditional),
        "uniform" => Ok(TauStep::Uniform),
        "local" => Ok(TauStep::Local { radius: tau_radius.unwrap_or(10) }),
        other => Err(PyValueError::new_err(format!(
            "invalid tau_step {other:?} (expected 'conditional', 'uniform', or 'local')"
        ))),
    }
}

#[cfg(feature = "python-bindings")]
fn extract_init(init: Option<&str>) -> PyResult<InitStrategy> {
    match init.unwrap_or("conditional_mode").to_lowercase().as_str() {
        "conditional_mode" | "mode" => Ok(InitStrategy::ConditionalMode),
        "prior" => Ok(InitStrategy::Prior),
        other => Err(PyValueError::new_err(format!(
            "invalid init {other:?} (expected 'conditional_mode' or 'prior')"
        ))),
    }
}

#[cfg(feature = "python-bindings")]
fn extract_report_mode(report: Option<&str>) -> PyResult<ReportMode> {
    match report.unwrap_or("point").to_lowercase().as_str() {
        "point" => Ok(ReportMode::Point),
        "range" => Ok(ReportMode::Range),
        other => Err(PyValueError::new_err(format!(
            "invalid report mode {other:?} (expected 'point' or 'range')"
        ))),
    }
}

/// Build validated [`AnalysisOptions`] from keyword arguments, starting from
/// the defaults.
#[cfg(feature = "python-bindings")]
pub fn extract_analysis_options(
    draws: Option<usize>, tune: Option<usize>, chains: Option<usize>, seed: Option<u64>,
    target_accept: Option<f64>, max_divergence_fraction: Option<f64>, tau_step: Option<&str>,
    tau_radius: Option<usize>, init: Option<&str>, line_search: Option<&str>,
    ci_level: Option<f64>, report: Option<&str>,
) -> PyResult<AnalysisOptions> {
    let defaults = SamplerOptions::default();
    let mut mode = defaults.mode;
    if let Some(name) = line_search {
        mode.line_searcher = name
            .parse::<LineSearcher>()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
    }
    let sampler = SamplerOptions {
        draws: draws.unwrap_or(defaults.draws),
        tune: tune.unwrap_or(defaults.tune),
        chains: chains.unwrap_or(defaults.chains),
        seed: seed.unwrap_or(defaults.seed),
        target_accept: target_accept.unwrap_or(defaults.target_accept),
        max_divergence_fraction: max_divergence_fraction
            .unwrap_or(defaults.max_divergence_fraction),
        tau_step: extract_tau_step(tau_step, tau_radius)?,
        init: extract_init(init)?,
        mode,
        ..defaults
    };
    let opts = AnalysisOptions {
        sampler,
        ci_level: ci_level.unwrap_or(AnalysisOptions::default().ci_level),
        report: extract_report_mode(report)?,
        ..AnalysisOptions::default()
    };
    opts.validate()?;
    Ok(opts)
}
