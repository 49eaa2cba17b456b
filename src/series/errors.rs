//! series::errors — error types for price cleaning and log-return construction.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used by the series preprocessor.
//! Row-level problems (an unparseable date, a non-positive price) are never
//! reported through this type: they are dropped during cleaning. Only
//! structural failures of the whole input surface here.
//!
//! Key behaviors
//! -------------
//! - [`SeriesError::DataFormat`] reports an input that produced no usable row
//!   at all, or a tabular source that lacks the required columns.
//! - [`SeriesError::InsufficientData`] reports a cleaned series that is too
//!   short for the requested computation (e.g. fewer than two prices for a
//!   log-return).
//! - `Display` messages are phrased in terms of the domain constraint that
//!   was violated.
//!
//! Conventions
//! -----------
//! - Indices are 0-based.
//! - With the `python-bindings` feature, every variant converts into a
//!   `PyValueError` carrying the `Display` message.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use chrono::NaiveDate;

/// Result alias for series preprocessing.
pub type SeriesResult<T> = Result<T, SeriesError>;

/// SeriesError — structural failures of the series preprocessor.
///
/// Variants
/// --------
/// - `DataFormat { reason }`
///   The input as a whole is malformed: rows were supplied but none carried a
///   parseable date and a positive price, or required columns are missing.
/// - `InsufficientData { required, found }`
///   The cleaned series has `found` observations where at least `required`
///   are needed.
/// - `LengthMismatch { dates, values }`
///   A typed constructor received date and value vectors of different length.
/// - `NonFiniteValue { index, value }`
///   A typed constructor received a NaN or ±∞ value.
/// - `UnorderedDates { index, previous, current }`
///   A typed constructor received dates that are not strictly increasing.
/// - `InvalidWindow { start, end }`
///   A date window whose start lies after its end.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    // ---- Whole-input failures ----
    DataFormat { reason: String },
    InsufficientData { required: usize, found: usize },

    // ---- Typed construction ----
    LengthMismatch { dates: usize, values: usize },
    NonFiniteValue { index: usize, value: f64 },
    UnorderedDates { index: usize, previous: NaiveDate, current: NaiveDate },

    // ---- Windowing ----
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

impl std::error::Error for SeriesError {}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesError::DataFormat { reason } => {
                write!(f, "Malformed price input: {reason}")
            }
            SeriesError::InsufficientData { required, found } => {
                write!(f, "Need at least {required} valid observations; found {found}.")
            }
            SeriesError::LengthMismatch { dates, values } => {
                write!(f, "Got {dates} dates but {values} values; lengths must match.")
            }
            SeriesError::NonFiniteValue { index, value } => {
                write!(f, "Value at index {index} is non-finite: {value}")
            }
            SeriesError::UnorderedDates { index, previous, current } => write!(
                f,
                "Dates must be strictly increasing; index {index} has {current} after {previous}."
            ),
            SeriesError::InvalidWindow { start, end } => {
                write!(f, "Window start {start} lies after window end {end}.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SeriesError> for PyErr {
    fn from(err: SeriesError) -> PyErr {
        PyValueError::new_err(format!("SeriesError: {err}"))
    }
}
