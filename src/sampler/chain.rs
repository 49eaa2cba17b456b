//! sampler::chain — one Markov chain of the hybrid sampler.
//!
//! Purpose
//! -------
//! Run `tune + draws` iterations of the two-block Gibbs scheme:
//! an HMC transition for `θ = [mu_before, mu_after, ln sigma]` at fixed
//! `tau`, then a tau update at fixed `θ`.
//!
//! Key behaviors
//! -------------
//! - Seed the chain's private stream with `seed + chain` (wrapping), so a
//!   chain's output depends only on its index and the run inputs.
//! - Start from [`InitStrategy`]: prior draws, or the L-BFGS conditional
//!   mode at a uniformly drawn `tau` (falling back to the data moments
//!   when the search fails).
//! - Adapt step size throughout warm-up and the diagonal inverse mass
//!   inside the [`WarmupSchedule`] window.
//! - Count divergences among retained transitions and stop with
//!   `SamplerError::SamplingDivergence` as soon as the allowance is
//!   exceeded.
//!
//! Invariants & assumptions
//! ------------------------
//! - `opts` has been validated by the caller.
//! - The cached HMC point is re-evaluated whenever `tau` changes, so its
//!   log-density always refers to the current break index.
use crate::{
    changepoint::{ChangePointModel, LOG_SIGMA, MU_AFTER, MU_BEFORE, THETA_DIM},
    optimization::mode_finder::{ModeOptions, Theta, maximize},
    sampler::{
        adapt::{DiagonalWelford, DualAveraging, WarmupSchedule},
        errors::{SamplerError, SamplerResult},
        hmc::{HmcPoint, find_reasonable_step_size, transition},
        options::{InitStrategy, SamplerOptions},
        tau::update_tau,
        trace::ChainTrace,
    },
};
use ndarray::{Array1, array};
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, warn};

/// Floor for a prior-drawn volatility, keeping `ln sigma` finite.
const MIN_INIT_SIGMA: f64 = 1e-8;

/// Starting step size handed to the step-size search.
const STEP_SEARCH_START: f64 = 1.0;

/// Chain-private RNG stream.
pub fn chain_rng(seed: u64, chain: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(chain as u64))
}

/// Draw the starting `(tau, θ)` for a chain.
///
/// `mode` configures the L-BFGS search and is ignored for
/// `InitStrategy::Prior`.
pub fn initial_state<R: Rng>(
    model: &ChangePointModel, init: InitStrategy, mode: &ModeOptions, chain: usize, rng: &mut R,
) -> (usize, Theta) {
    let tau = rng.gen_range(0..model.n_obs());
    let theta = match init {
        InitStrategy::Prior => {
            let priors = model.priors();
            let z: [f64; 3] = [
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            ];
            let sigma = (z[2] * priors.sigma.scale).abs().max(MIN_INIT_SIGMA);
            array![z[0] * priors.mu_before.scale, z[1] * priors.mu_after.scale, sigma.ln()]
        }
        InitStrategy::ConditionalMode => {
            let start = model.initial_theta();
            match maximize(model, start.clone(), &tau, mode) {
                Ok(outcome) => {
                    debug!(
                        chain,
                        tau,
                        line_searcher = ?mode.line_searcher,
                        iterations = outcome.iterations,
                        converged = outcome.converged,
                        "conditional mode found"
                    );
                    outcome.theta_hat
                }
                Err(err) => {
                    warn!(chain, tau, error = %err, "conditional mode search failed; starting from data moments");
                    start
                }
            }
        }
    };
    (tau, theta)
}

/// Running totals over retained iterations.
#[derive(Debug, Default)]
struct Tally {
    accept_prob_sum: f64,
    tau_accepts: usize,
    divergences: usize,
}

/// Run chain `chain` to completion.
///
/// Errors
/// ------
/// - `SamplerError::InitializationFailed` if the density is not finite at
///   the starting point.
/// - `SamplerError::NonFiniteDensity` if a tau move lands on a break index
///   where the current `θ` has no finite density.
/// - `SamplerError::SamplingDivergence` once retained divergences exceed
///   [`SamplerOptions::divergence_allowance`].
pub fn run_chain(
    model: &ChangePointModel, opts: &SamplerOptions, chain: usize,
) -> SamplerResult<ChainTrace> {
    let mut rng = chain_rng(opts.seed, chain);
    let (mut tau, theta0) = initial_state(model, opts.init, &opts.mode, chain, &mut rng);
    let mut point = HmcPoint::evaluate(model, &tau, theta0).ok_or_else(|| {
        SamplerError::InitializationFailed {
            chain,
            reason: format!("non-finite log-density at tau = {tau}"),
        }
    })?;

    let mut inv_mass = Array1::<f64>::ones(THETA_DIM);
    let mut step_size = match opts.initial_step_size {
        Some(step) => step,
        None => find_reasonable_step_size(model, &tau, &point, &inv_mass, STEP_SEARCH_START, &mut rng),
    };
    let mut dual = DualAveraging::new(step_size, opts.target_accept);
    let schedule = WarmupSchedule::new(opts.tune);
    let mut welford = DiagonalWelford::new(THETA_DIM);
    let allowance = opts.divergence_allowance();

    let mut trace = ChainTrace::with_capacity(opts.draws);
    let mut tally = Tally::default();

    for iteration in 0..opts.tune + opts.draws {
        let warmup = schedule.is_warmup(iteration);

        // ---- continuous block ----
        let step = transition(model, &tau, &point, step_size, &inv_mass, opts.leapfrog_steps, &mut rng);
        point = step.point;

        if warmup {
            step_size = dual.update(step.accept_prob);
            if schedule.in_mass_window(iteration) {
                welford.push(&point.theta);
            }
            if schedule.closes_mass_window(iteration) {
                if let Some(var) = welford.regularized_variance() {
                    inv_mass = var;
                }
                step_size = find_reasonable_step_size(model, &tau, &point, &inv_mass, step_size, &mut rng);
                dual = DualAveraging::new(step_size, opts.target_accept);
                debug!(chain, iteration, ?inv_mass, step_size, "mass matrix adapted");
            }
            if schedule.is_last_warmup(iteration) {
                step_size = dual.final_step();
            }
        } else {
            tally.accept_prob_sum += step.accept_prob;
            if step.divergent {
                tally.divergences += 1;
                if tally.divergences > allowance {
                    let draw = iteration - opts.tune;
                    warn!(chain, draw, divergences = tally.divergences, "divergence allowance exceeded");
                    return Err(SamplerError::SamplingDivergence {
                        chain,
                        iteration: draw,
                        divergences: tally.divergences,
                        draws: opts.draws,
                    });
                }
            }
        }

        // ---- break index ----
        let (mu_before, mu_after) = (point.theta[MU_BEFORE], point.theta[MU_AFTER]);
        let sigma = point.theta[LOG_SIGMA].exp();
        let moved = update_tau(model, opts.tau_step, tau, mu_before, mu_after, sigma, &mut rng);
        if !warmup && moved.accepted {
            tally.tau_accepts += 1;
        }
        if moved.tau != tau {
            tau = moved.tau;
            point = HmcPoint::evaluate(model, &tau, point.theta)
                .ok_or(SamplerError::NonFiniteDensity { chain, tau })?;
        }

        if !warmup {
            trace.push(tau, mu_before, mu_after, sigma);
        }
    }

    let draws = opts.draws as f64;
    trace.stats.mean_accept_prob = tally.accept_prob_sum / draws;
    trace.stats.tau_acceptance_rate = tally.tau_accepts as f64 / draws;
    trace.stats.divergences = tally.divergences;
    trace.stats.step_size = step_size;
    trace.stats.inv_mass = inv_mass.to_vec();
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changepoint::ChangePointPriors;
    use crate::optimization::mode_finder::{LineSearcher, Tolerances};
    use crate::sampler::options::TauStep;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Per-chain determinism and chain-index seeding.
    // - Both initialization strategies producing finite starts.
    // - The divergence stop with a zero allowance.
    // - Trace lengths and statistics bookkeeping.
    //
    // Posterior accuracy on synthetic breaks lives in the integration tests.
    // -------------------------------------------------------------------------

    fn model() -> ChangePointModel {
        let y = Array1::from_iter((0..60).map(|i| {
            let noise = 0.004 * (((i * 37) % 17) as f64 / 8.0 - 1.0);
            if i < 30 { noise } else { 0.03 + noise }
        }));
        ChangePointModel::from_observed(y, ChangePointPriors::default()).expect("valid model")
    }

    fn quick() -> SamplerOptions {
        SamplerOptions::default().with_draws(100).with_tune(100)
    }

    #[test]
    // Purpose
    // -------
    // A chain is a pure function of (model, options, chain index).
    fn chain_is_deterministic_per_index() {
        let model = model();
        let opts = quick();

        let a = run_chain(&model, &opts, 1).expect("chain runs");
        let b = run_chain(&model, &opts, 1).expect("chain runs");
        let c = run_chain(&model, &opts, 2).expect("chain runs");

        assert_eq!(a, b);
        assert_ne!(a.mu_before, c.mu_before);
    }

    #[test]
    fn both_init_strategies_start_at_finite_points() {
        let model = model();
        for init in [InitStrategy::Prior, InitStrategy::ConditionalMode] {
            let mut rng = chain_rng(42, 0);

            let (tau, theta) = initial_state(&model, init, &ModeOptions::default(), 0, &mut rng);

            assert!(tau < model.n_obs());
            assert!(HmcPoint::evaluate(&model, &tau, theta).is_some(), "{init:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Every mode-finder configuration starts the chain at the same
    // conditional mode, and the configured settings are the ones used.
    //
    // Given
    // -----
    // - The default search, Hager-Zhang with a short history, and a single
    //   L-BFGS iteration, all from the same chain stream.
    //
    // Expect
    // ------
    // - Identical starting tau (drawn before the search).
    // - Hager-Zhang lands on the default mode; the one-iteration search
    //   stops short of it.
    fn mode_options_shape_the_conditional_start() {
        // Arrange
        let model = model();
        let hager_zhang = ModeOptions {
            line_searcher: LineSearcher::HagerZhang,
            lbfgs_mem: Some(3),
            ..ModeOptions::default()
        };
        let one_step = ModeOptions {
            tols: Tolerances { tol_grad: None, tol_cost: None, max_iter: Some(1) },
            ..ModeOptions::default()
        };
        let start = |mode: &ModeOptions| {
            let mut rng = chain_rng(42, 0);
            initial_state(&model, InitStrategy::ConditionalMode, mode, 0, &mut rng)
        };

        // Act
        let (tau_mt, theta_mt) = start(&ModeOptions::default());
        let (tau_hz, theta_hz) = start(&hager_zhang);
        let (tau_one, theta_one) = start(&one_step);

        // Assert
        assert_eq!(tau_mt, tau_hz);
        assert_eq!(tau_mt, tau_one);
        for k in 0..THETA_DIM {
            assert!((theta_mt[k] - theta_hz[k]).abs() < 1e-5, "coordinate {k}");
        }
        let best = model.log_density_at(tau_mt, &theta_mt);
        assert!(model.log_density_at(tau_hz, &theta_hz) >= best - 1e-6);
        assert!(model.log_density_at(tau_one, &theta_one) < best - 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // With no tolerated divergences and an absurd fixed step, the first
    // retained transition stops the chain.
    //
    // Given
    // -----
    // - tune = 0, initial_step_size = 10, max_divergence_fraction = 0.
    //
    // Expect
    // ------
    // - `SamplingDivergence { chain: 3, iteration: 0, divergences: 1, .. }`.
    fn zero_allowance_stops_at_first_divergence() {
        // Arrange
        let model = model();
        let opts = SamplerOptions {
            tune: 0,
            draws: 50,
            initial_step_size: Some(10.0),
            max_divergence_fraction: 0.0,
            ..SamplerOptions::default()
        };

        // Act
        let err = run_chain(&model, &opts, 3).unwrap_err();

        // Assert
        assert_eq!(
            err,
            SamplerError::SamplingDivergence { chain: 3, iteration: 0, divergences: 1, draws: 50 }
        );
    }

    #[test]
    fn trace_lengths_and_stats_are_consistent() {
        let model = model();
        let opts = quick().with_tau_step(TauStep::Local { radius: 2 });

        let trace = run_chain(&model, &opts, 0).expect("chain runs");

        assert_eq!(trace.len(), 100);
        assert!(trace.is_aligned());
        assert!(trace.tau.iter().all(|&t| t < 60));
        assert!(trace.sigma.iter().all(|&s| s > 0.0));
        assert!((0.0..=1.0).contains(&trace.stats.mean_accept_prob));
        assert!((0.0..=1.0).contains(&trace.stats.tau_acceptance_rate));
        assert!(trace.stats.step_size > 0.0);
        assert_eq!(trace.stats.inv_mass.len(), THETA_DIM);
    }
}
