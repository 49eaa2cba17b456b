//! pipeline::errors — stage-tagged failures of an end-to-end analysis.
//!
//! Purpose
//! -------
//! Wrap the error of whichever subsystem stopped an analysis so that the
//! caller learns both what went wrong and at which stage. A pipeline never
//! substitutes a fabricated change point for a failure.
//!
//! Conventions
//! -----------
//! - Row-level data issues never reach this type; they are absorbed by the
//!   series and event cleaners.
//! - With the `python-bindings` feature, every variant converts into a
//!   `PyValueError` whose message starts with the stage name.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{
    changepoint::ModelError, sampler::SamplerError, series::SeriesError, summary::SummaryError,
};

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Stage of an analysis, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Configuration,
    Preprocess,
    Model,
    Sampling,
    Summary,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Configuration => "configuration",
            Stage::Preprocess => "preprocess",
            Stage::Model => "model",
            Stage::Sampling => "sampling",
            Stage::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// PipelineError — the failure of one analysis stage.
///
/// Variants
/// --------
/// - `Load { source, reason }`
///   A file could not be opened or read as CSV.
/// - `Configuration { reason }`
///   Options failed to parse or validate (credible level, TOML syntax).
/// - `Preprocess(SeriesError)` / `Model(ModelError)` /
///   `Sampling(SamplerError)` / `Summary(SummaryError)`
///   The wrapped subsystem error.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Load { source: String, reason: String },
    Configuration { reason: String },
    Preprocess(SeriesError),
    Model(ModelError),
    Sampling(SamplerError),
    Summary(SummaryError),
}

impl PipelineError {
    /// Stage at which the analysis stopped.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Load { .. } => Stage::Load,
            PipelineError::Configuration { .. } => Stage::Configuration,
            PipelineError::Preprocess(_) => Stage::Preprocess,
            PipelineError::Model(_) => Stage::Model,
            PipelineError::Sampling(_) => Stage::Sampling,
            PipelineError::Summary(_) => Stage::Summary,
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Preprocess(e) => Some(e),
            PipelineError::Model(e) => Some(e),
            PipelineError::Sampling(e) => Some(e),
            PipelineError::Summary(e) => Some(e),
            PipelineError::Load { .. } | PipelineError::Configuration { .. } => None,
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = self.stage();
        match self {
            PipelineError::Load { source, reason } => {
                write!(f, "[{stage}] Could not read {source}: {reason}")
            }
            PipelineError::Configuration { reason } => write!(f, "[{stage}] {reason}"),
            PipelineError::Preprocess(e) => write!(f, "[{stage}] {e}"),
            PipelineError::Model(e) => write!(f, "[{stage}] {e}"),
            PipelineError::Sampling(e) => write!(f, "[{stage}] {e}"),
            PipelineError::Summary(e) => write!(f, "[{stage}] {e}"),
        }
    }
}

impl From<SeriesError> for PipelineError {
    fn from(err: SeriesError) -> Self {
        PipelineError::Preprocess(err)
    }
}

impl From<ModelError> for PipelineError {
    fn from(err: ModelError) -> Self {
        PipelineError::Model(err)
    }
}

impl From<SamplerError> for PipelineError {
    fn from(err: SamplerError) -> Self {
        PipelineError::Sampling(err)
    }
}

impl From<SummaryError> for PipelineError {
    fn from(err: SummaryError) -> Self {
        PipelineError::Summary(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<PipelineError> for PyErr {
    fn from(err: PipelineError) -> PyErr {
        PyValueError::new_err(format!("PipelineError: {err}"))
    }
}
