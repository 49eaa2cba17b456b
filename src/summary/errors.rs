//! Errors for reducing posterior draws to summaries.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for summary operations.
pub type SummaryResult<T> = Result<T, SummaryError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// No chains, or chains without draws.
    EmptySamples,

    /// A chain's length differs from the first chain's, or its parameter
    /// vectors disagree in length.
    RaggedChains { chain: usize, expected: usize, found: usize },

    /// Credible level must lie strictly inside (0, 1).
    InvalidCredibleLevel { value: f64 },

    /// A tau draw indexes past the end of the return series.
    TauOutOfRange { tau: usize, n: usize },
}

impl std::error::Error for SummaryError {}

impl std::fmt::Display for SummaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryError::EmptySamples => write!(f, "Posterior sample set is empty"),
            SummaryError::RaggedChains { chain, expected, found } => {
                write!(f, "Chain {chain} has {found} draws; expected {expected}")
            }
            SummaryError::InvalidCredibleLevel { value } => {
                write!(f, "Credible level must be in (0, 1); got {value}")
            }
            SummaryError::TauOutOfRange { tau, n } => {
                write!(f, "Change-point draw {tau} outside a series of {n} log-returns")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<SummaryError> for PyErr {
    fn from(err: SummaryError) -> PyErr {
        PyValueError::new_err(format!("SummaryError: {err}"))
    }
}
