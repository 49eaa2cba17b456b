//! Errors for the change-point model (observed data checks, prior
//! hyperparameters, and parameter-space validation).
//!
//! ## Conventions
//! - **Indices are 0-based**; `tau` ranges over `0..n` where `n` is the
//!   number of log-returns.
//! - Prior scales must be **strictly positive and finite**.
//! - Unconstrained parameter vectors have length 3:
//!   `[mu_before, mu_after, ln sigma]`.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::changepoint::priors::PriorFamily;

/// Result alias for model construction and evaluation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Unified error type for the change-point model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Observed data ----
    /// No observations to condition on.
    EmptySeries,

    /// An observation is NaN/±inf.
    NonFiniteData { index: usize, value: f64 },

    /// Every observation takes the same value; the volatility posterior
    /// has no mass away from zero.
    ConstantSeries { n: usize, value: f64 },

    // ---- Priors ----
    /// A prior scale is non-finite or ≤ 0.
    InvalidPriorScale { name: &'static str, scale: f64 },

    /// A prior uses a family the parameter's support does not admit.
    InvalidPriorFamily { name: &'static str, found: PriorFamily, expected: PriorFamily },

    // ---- Parameters ----
    /// Change-point index outside `0..n`.
    TauOutOfRange { tau: usize, n: usize },

    /// Volatility must be finite and > 0.
    InvalidSigma { value: f64 },

    /// A regime mean is NaN/±inf.
    NonFiniteMean { name: &'static str, value: f64 },

    /// Unconstrained vector has the wrong length.
    ThetaLengthMismatch { expected: usize, actual: usize },
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Observed data ----
            ModelError::EmptySeries => write!(f, "Observed log-return series is empty."),
            ModelError::NonFiniteData { index, value } => {
                write!(f, "Observation at index {index} is non-finite: {value}")
            }
            ModelError::ConstantSeries { n, value } => write!(
                f,
                "All {n} observations equal {value}; a series without variation has no \
                 volatility to estimate"
            ),

            // ---- Priors ----
            ModelError::InvalidPriorScale { name, scale } => {
                write!(f, "Prior scale for {name} must be finite and > 0; got {scale}")
            }
            ModelError::InvalidPriorFamily { name, found, expected } => {
                write!(f, "Prior for {name} must be {expected:?}; got {found:?}")
            }

            // ---- Parameters ----
            ModelError::TauOutOfRange { tau, n } => {
                write!(f, "Change-point index {tau} outside 0..{n}")
            }
            ModelError::InvalidSigma { value } => {
                write!(f, "sigma must be finite and > 0; got {value}")
            }
            ModelError::NonFiniteMean { name, value } => {
                write!(f, "{name} must be finite; got {value}")
            }
            ModelError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Expected parameter vector of length {expected}; got {actual}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ModelError> for PyErr {
    fn from(err: ModelError) -> PyErr {
        PyValueError::new_err(format!("ModelError: {err}"))
    }
}
