//! pipeline::options — configuration of a full analysis.
//!
//! Every field has a default, so an empty TOML document (or one setting any
//! subset of keys) describes a valid analysis:
//!
//! ```toml
//! ci_level = 0.9
//! report = "range"
//! start = "2015-01-01"
//!
//! [priors.sigma]
//! family = "half_normal"
//! scale = 0.02
//!
//! [sampler]
//! draws = 1000
//! chains = 4
//! tau_step = { kind = "local", radius = 25 }
//!
//! [sampler.mode]
//! line_searcher = "hager_zhang"
//! lbfgs_mem = 10
//! ```
//!
//! Window bounds are quoted ISO dates.
use crate::{
    changepoint::ChangePointPriors,
    pipeline::errors::{PipelineError, PipelineResult},
    sampler::SamplerOptions,
    summary::DEFAULT_CI_LEVEL,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the break location is reported in the flat record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Only the median change date; interval bounds are left empty.
    #[default]
    Point,
    /// Median change date plus the credible interval bounds.
    Range,
}

/// AnalysisOptions — priors, sampler settings and reporting choices.
///
/// Fields
/// ------
/// - `priors`: model hyperparameters.
/// - `sampler`: MCMC settings.
/// - `ci_level`: mass of the tau credible interval, in (0, 1).
/// - `report`: [`ReportMode`] for the flat record.
/// - `start` / `end`: optional inclusive window applied to prices before
///   log-returns are computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub priors: ChangePointPriors,
    pub sampler: SamplerOptions,
    pub ci_level: f64,
    pub report: ReportMode,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            priors: ChangePointPriors::default(),
            sampler: SamplerOptions::default(),
            ci_level: DEFAULT_CI_LEVEL,
            report: ReportMode::default(),
            start: None,
            end: None,
        }
    }
}

impl AnalysisOptions {
    /// Parse options from a TOML document and validate them.
    ///
    /// Errors
    /// ------
    /// - `PipelineError::Configuration` for TOML syntax or type errors and
    ///   for any bound checked by [`AnalysisOptions::validate`].
    pub fn from_toml_str(source: &str) -> PipelineResult<Self> {
        let opts: AnalysisOptions = toml::from_str(source)
            .map_err(|e| PipelineError::Configuration { reason: e.to_string() })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check every option before any data is touched.
    pub fn validate(&self) -> PipelineResult<()> {
        let invalid = |reason: String| PipelineError::Configuration { reason };
        if !(self.ci_level > 0.0 && self.ci_level < 1.0) {
            return Err(invalid(format!(
                "Credible level must be in (0, 1); got {}",
                self.ci_level
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(invalid(format!("Window start {start} lies after window end {end}")));
            }
        }
        self.priors.validate().map_err(|e| invalid(e.to_string()))?;
        self.sampler.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}
