//! sampler::options — run configuration for the hybrid sampler.
//!
//! Purpose
//! -------
//! Hold every knob of a sampling run in one serializable struct with
//! defaults matching a conservative NUTS-style setup: 4 chains of 2000
//! retained draws after 1000 warm-up iterations, target acceptance 0.95.
//!
//! Key behaviors
//! -------------
//! - `serde(default)` on every field, so a TOML table may set any subset.
//! - [`SamplerOptions::validate`] is called by the sampler entry points;
//!   constructing an invalid value is allowed, running it is not.
//! - `with_*` builders for the fields most often changed in code.
use crate::{
    optimization::mode_finder::ModeOptions,
    sampler::errors::{SamplerError, SamplerResult},
};
use serde::{Deserialize, Serialize};

/// How `tau` moves once per iteration while the continuous block is fixed.
///
/// - `Conditional`: exact draw from the full conditional over all indices.
/// - `Uniform`: Metropolis with an index proposed uniformly over `0..n`.
/// - `Local { radius }`: Metropolis with a jump of 1..=radius in either
///   direction; proposals outside `0..n` are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TauStep {
    #[default]
    Conditional,
    Uniform,
    Local { radius: usize },
}

/// Where each chain starts.
///
/// Both strategies draw the starting `tau` uniformly from the chain's own
/// stream. `Prior` then draws the continuous block from the priors;
/// `ConditionalMode` maximizes the conditional log-density at that `tau`
/// with L-BFGS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    Prior,
    #[default]
    ConditionalMode,
}

/// SamplerOptions — configuration of a multi-chain run.
///
/// Fields
/// ------
/// - `draws`: retained draws per chain (≥ 1).
/// - `tune`: warm-up iterations per chain, discarded.
/// - `chains`: number of independent chains (≥ 2).
/// - `seed`: base seed; chain `c` uses `seed + c` (wrapping).
/// - `target_accept`: dual-averaging target in (0, 1).
/// - `max_divergence_fraction`: tolerated share of divergent retained
///   transitions per chain, in [0, 1].
/// - `leapfrog_steps`: integration steps per HMC transition (≥ 1).
/// - `tau_step`: [`TauStep`] used for the discrete update.
/// - `init`: [`InitStrategy`] for chain starting points.
/// - `initial_step_size`: skip the step-size search and start dual
///   averaging from this value.
/// - `mode`: L-BFGS settings for `InitStrategy::ConditionalMode`
///   (`[sampler.mode]` in TOML).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerOptions {
    pub draws: usize,
    pub tune: usize,
    pub chains: usize,
    pub seed: u64,
    pub target_accept: f64,
    pub max_divergence_fraction: f64,
    pub leapfrog_steps: usize,
    pub tau_step: TauStep,
    pub init: InitStrategy,
    pub initial_step_size: Option<f64>,
    pub mode: ModeOptions,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        SamplerOptions {
            draws: 2000,
            tune: 1000,
            chains: 4,
            seed: 42,
            target_accept: 0.95,
            max_divergence_fraction: 0.05,
            leapfrog_steps: 16,
            tau_step: TauStep::default(),
            init: InitStrategy::default(),
            initial_step_size: None,
            mode: ModeOptions::default(),
        }
    }
}

impl SamplerOptions {
    /// Errors
    /// ------
    /// - One `SamplerError::Invalid*` variant per violated bound, checked
    ///   in field order.
    pub fn validate(&self) -> SamplerResult<()> {
        if self.draws == 0 {
            return Err(SamplerError::InvalidDraws { draws: self.draws });
        }
        if self.chains < 2 {
            return Err(SamplerError::InvalidChains { chains: self.chains });
        }
        if !(self.target_accept > 0.0 && self.target_accept < 1.0) {
            return Err(SamplerError::InvalidTargetAccept { value: self.target_accept });
        }
        if !(0.0..=1.0).contains(&self.max_divergence_fraction) {
            return Err(SamplerError::InvalidDivergenceFraction {
                value: self.max_divergence_fraction,
            });
        }
        if self.leapfrog_steps == 0 {
            return Err(SamplerError::InvalidLeapfrogSteps { steps: self.leapfrog_steps });
        }
        if let TauStep::Local { radius: 0 } = self.tau_step {
            return Err(SamplerError::InvalidTauRadius { radius: 0 });
        }
        if let Some(value) = self.initial_step_size {
            if !value.is_finite() || value <= 0.0 {
                return Err(SamplerError::InvalidStepSize { value });
            }
        }
        self.mode.validate().map_err(SamplerError::InvalidModeOptions)?;
        Ok(())
    }

    /// Largest number of divergent retained transitions a chain may have.
    pub fn divergence_allowance(&self) -> usize {
        (self.max_divergence_fraction * self.draws as f64).floor() as usize
    }

    pub fn with_draws(mut self, draws: usize) -> Self {
        self.draws = draws;
        self
    }

    pub fn with_tune(mut self, tune: usize) -> Self {
        self.tune = tune;
        self
    }

    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_tau_step(mut self, tau_step: TauStep) -> Self {
        self.tau_step = tau_step;
        self
    }

    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    pub fn with_mode(mut self, mode: ModeOptions) -> Self {
        self.mode = mode;
        self
    }
}
