//! Entry points for multi-chain posterior sampling.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    changepoint::ChangePointModel,
    sampler::{
        chain::run_chain,
        errors::{SamplerError, SamplerResult},
        options::SamplerOptions,
        trace::PosteriorSampleSet,
    },
};
use rayon::prelude::*;
use tracing::info;

/// Shared flag for cooperative cancellation. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Draw from the posterior of `model` with `opts.chains` parallel chains.
///
/// Errors
/// ------
/// - Option validation errors from [`SamplerOptions::validate`].
/// - The error of the lowest-indexed failing chain.
pub fn sample(model: &ChangePointModel, opts: &SamplerOptions) -> SamplerResult<PosteriorSampleSet> {
    sample_with_cancel(model, opts, &CancelToken::new())
}

/// [`sample`] with a cancellation token checked before each chain starts.
///
/// Errors
/// ------
/// - `SamplerError::Cancelled` when the token is set before any chain that
///   would otherwise be reported first.
/// - Otherwise as [`sample`].
pub fn sample_with_cancel(
    model: &ChangePointModel, opts: &SamplerOptions, cancel: &CancelToken,
) -> SamplerResult<PosteriorSampleSet> {
    opts.validate()?;
    info!(
        n_obs = model.n_obs(),
        chains = opts.chains,
        draws = opts.draws,
        tune = opts.tune,
        seed = opts.seed,
        "sampling posterior"
    );

    let results: Vec<SamplerResult<_>> = (0..opts.chains)
        .into_par_iter()
        .map(|chain| {
            if cancel.is_cancelled() {
                return Err(SamplerError::Cancelled);
            }
            let trace = run_chain(model, opts, chain)?;
            info!(
                chain,
                mean_accept_prob = trace.stats.mean_accept_prob,
                divergences = trace.stats.divergences,
                step_size = trace.stats.step_size,
                "chain finished"
            );
            Ok(trace)
        })
        .collect();

    let chains = results.into_iter().collect::<SamplerResult<Vec<_>>>()?;
    Ok(PosteriorSampleSet::new(chains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changepoint::ChangePointPriors;
    use ndarray::Array1;

    fn model() -> ChangePointModel {
        let y = Array1::from_iter((0..40).map(|i| {
            let noise = 0.003 * (((i * 13) % 7) as f64 / 3.0 - 1.0);
            if i < 20 { noise } else { -0.02 + noise }
        }));
        ChangePointModel::from_observed(y, ChangePointPriors::default()).expect("valid model")
    }

    #[test]
    fn invalid_options_fail_before_sampling() {
        let opts = SamplerOptions::default().with_chains(1);

        assert_eq!(
            sample(&model(), &opts).unwrap_err(),
            SamplerError::InvalidChains { chains: 1 }
        );
    }

    #[test]
    fn cancelled_token_stops_the_run() {
        let token = CancelToken::new();
        token.clone().cancel();

        let err = sample_with_cancel(&model(), &SamplerOptions::default(), &token).unwrap_err();

        assert_eq!(err, SamplerError::Cancelled);
    }

    #[test]
    // Purpose
    // -------
    // Chains come back in index order and match a sequential run exactly.
    fn parallel_output_matches_sequential_chains() {
        let model = model();
        let opts = SamplerOptions::default().with_draws(60).with_tune(60).with_chains(3);

        let set = sample(&model, &opts).expect("sampling succeeds");

        assert_eq!(set.n_chains(), 3);
        for (index, chain) in set.chains().iter().enumerate() {
            assert_eq!(chain, &run_chain(&model, &opts, index).expect("chain runs"));
        }
    }
}
