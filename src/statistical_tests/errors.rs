//! statistical_tests::errors — error types for the stationarity tests.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the unit-root (ADF) and
//! level-stationarity (KPSS) tests, with a conversion to Python exceptions
//! for the PyO3 layer.
//!
//! Key behaviors
//! -------------
//! - Input problems (too few points, non-finite values, no variation) are
//!   reported before any regression is run.
//! - A singular auxiliary regression surfaces as
//!   [`StatTestError::SingularRegression`] instead of a NaN statistic.
//!
//! Conventions
//! -----------
//! - Messages name the violated constraint rather than the internal step.
//! - With the `python-bindings` feature, every variant converts into a
//!   `PyValueError` carrying the `Display` message.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for the stationarity tests.
pub type StatTestResult<T> = Result<T, StatTestError>;

/// StatTestError — failures of the ADF and KPSS routines.
///
/// Variants
/// --------
/// - `InsufficientData { required, found }`
///   The series has `found` observations where the test needs `required`.
/// - `InvalidData { index, value }`
///   The observation at `index` is NaN or ±∞.
/// - `ConstantSeries { n }`
///   All `n` observations are equal, so both statistics are undefined.
/// - `InvalidMaxLag { maxlag, limit }`
///   A caller-supplied ADF lag bound exceeds `n / 2 − 2`.
/// - `InvalidLags { lags, n }`
///   A caller-supplied KPSS bandwidth is not below the sample size.
/// - `SingularRegression { lags }`
///   The ADF regression with `lags` lagged differences has a singular
///   cross-product matrix or no residual variation.
#[derive(Debug, Clone, PartialEq)]
pub enum StatTestError {
    // ---- Input validation ----
    InsufficientData { required: usize, found: usize },
    InvalidData { index: usize, value: f64 },
    ConstantSeries { n: usize },

    // ---- Tuning ----
    InvalidMaxLag { maxlag: usize, limit: usize },
    InvalidLags { lags: usize, n: usize },

    // ---- Numerical ----
    SingularRegression { lags: usize },
}

impl std::error::Error for StatTestError {}

impl std::fmt::Display for StatTestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatTestError::InsufficientData { required, found } => {
                write!(f, "Need at least {required} observations for this test; found {found}.")
            }
            StatTestError::InvalidData { index, value } => {
                write!(f, "Invalid observation {value} at index {index}. Must be a finite number.")
            }
            StatTestError::ConstantSeries { n } => {
                write!(f, "All {n} observations are equal; the test statistic is undefined.")
            }
            StatTestError::InvalidMaxLag { maxlag, limit } => {
                write!(f, "Invalid ADF maxlag {maxlag}. Must satisfy maxlag ≤ {limit}.")
            }
            StatTestError::InvalidLags { lags, n } => {
                write!(f, "Invalid KPSS lags {lags}. Must satisfy lags < n = {n}.")
            }
            StatTestError::SingularRegression { lags } => {
                write!(f, "ADF regression with {lags} lagged differences is singular.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<StatTestError> for PyErr {
    fn from(err: StatTestError) -> PyErr {
        PyValueError::new_err(format!("StatTestError: {err}"))
    }
}
