//! series::stats — descriptive summaries for prices and log-returns.
//!
//! A compact `describe` used by the exploratory step of an analysis (count,
//! mean, sample standard deviation, extremes and quartiles). Order
//! statistics come from `statrs`' [`Data`] container.
use crate::series::errors::{SeriesError, SeriesResult};
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Max, Median, Min, OrderStatistics};

/// Descriptive statistics of a numeric series.
///
/// `std` is the sample standard deviation (n − 1 denominator) and is `NaN`
/// for a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Summarize `values`.
///
/// Errors
/// ------
/// - `SeriesError::InsufficientData { required: 1, found: 0 }` for an empty
///   slice.
pub fn describe(values: &[f64]) -> SeriesResult<SeriesStats> {
    if values.is_empty() {
        return Err(SeriesError::InsufficientData { required: 1, found: 0 });
    }
    let mut data = Data::new(values.to_vec());
    Ok(SeriesStats {
        count: values.len(),
        mean: data.mean().unwrap_or(f64::NAN),
        std: data.std_dev().unwrap_or(f64::NAN),
        min: data.min(),
        q25: data.lower_quartile(),
        median: data.median(),
        q75: data.upper_quartile(),
        max: data.max(),
    })
}
