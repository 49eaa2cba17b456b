//! Errors for posterior sampling (option validation, chain start-up,
//! numerical breakdown, divergence accounting, and cancellation).
//!
//! ## Conventions
//! - `chain` is the 0-based chain index; `iteration` is the 0-based index
//!   of a retained draw (warm-up iterations are not counted).
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{changepoint::errors::ModelError, optimization::errors::OptError};

/// Result alias for sampler operations.
pub type SamplerResult<T> = Result<T, SamplerError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SamplerError {
    // ---- Options ----
    /// At least one retained draw per chain is required.
    InvalidDraws { draws: usize },

    /// Convergence diagnostics need at least two chains.
    InvalidChains { chains: usize },

    /// Target acceptance must lie strictly inside (0, 1).
    InvalidTargetAccept { value: f64 },

    /// Divergence tolerance must lie in [0, 1].
    InvalidDivergenceFraction { value: f64 },

    /// At least one leapfrog step per transition.
    InvalidLeapfrogSteps { steps: usize },

    /// Local tau proposals need a radius ≥ 1.
    InvalidTauRadius { radius: usize },

    /// Initial step size must be finite and > 0.
    InvalidStepSize { value: f64 },

    /// Conditional-mode settings rejected by the optimizer.
    InvalidModeOptions(OptError),

    // ---- Runtime ----
    /// No finite starting point could be established.
    InitializationFailed { chain: usize, reason: String },

    /// The log-density became non-finite after a tau move.
    NonFiniteDensity { chain: usize, tau: usize },

    /// Post-warm-up divergences exceeded the configured tolerance.
    SamplingDivergence { chain: usize, iteration: usize, divergences: usize, draws: usize },

    /// The run was cancelled before all chains started.
    Cancelled,

    // ---- Model ----
    Model(ModelError),
}

impl std::error::Error for SamplerError {}

impl std::fmt::Display for SamplerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            SamplerError::InvalidDraws { draws } => {
                write!(f, "Number of draws must be at least 1; got {draws}")
            }
            SamplerError::InvalidChains { chains } => {
                write!(f, "Number of chains must be at least 2; got {chains}")
            }
            SamplerError::InvalidTargetAccept { value } => {
                write!(f, "Target acceptance must be in (0, 1); got {value}")
            }
            SamplerError::InvalidDivergenceFraction { value } => {
                write!(f, "Maximum divergence fraction must be in [0, 1]; got {value}")
            }
            SamplerError::InvalidLeapfrogSteps { steps } => {
                write!(f, "Leapfrog steps must be at least 1; got {steps}")
            }
            SamplerError::InvalidTauRadius { radius } => {
                write!(f, "Local tau proposal radius must be at least 1; got {radius}")
            }
            SamplerError::InvalidStepSize { value } => {
                write!(f, "Initial step size must be finite and > 0; got {value}")
            }
            SamplerError::InvalidModeOptions(err) => {
                write!(f, "Invalid conditional-mode options: {err}")
            }

            // ---- Runtime ----
            SamplerError::InitializationFailed { chain, reason } => {
                write!(f, "Chain {chain} failed to initialize: {reason}")
            }
            SamplerError::NonFiniteDensity { chain, tau } => {
                write!(f, "Chain {chain}: log-density became non-finite at tau = {tau}")
            }
            SamplerError::SamplingDivergence { chain, iteration, divergences, draws } => {
                write!(
                    f,
                    "Chain {chain} diverged: {divergences} divergent transitions in {draws} draws \
                     (last at draw {iteration})"
                )
            }
            SamplerError::Cancelled => write!(f, "Sampling was cancelled"),

            // ---- Model ----
            SamplerError::Model(err) => write!(f, "Model error: {err}"),
        }
    }
}

impl From<ModelError> for SamplerError {
    fn from(err: ModelError) -> Self {
        SamplerError::Model(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<SamplerError> for PyErr {
    fn from(err: SamplerError) -> PyErr {
        PyValueError::new_err(format!("SamplerError: {err}"))
    }
}
