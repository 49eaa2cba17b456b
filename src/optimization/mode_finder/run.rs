//! Executor wiring: run an Argmin solver on an [`ArgMinAdapter`] and
//! normalize the final state into an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    mode_finder::{Grad, LogDensity, ModeOptions, OptimOutcome, Theta, adapter::ArgMinAdapter},
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run `solver` from `theta0` and return the best point found.
///
/// - `opts.tols.max_iter` caps iterations when present.
/// - With `opts.verbose`, the starting density is logged at debug level
///   and, under the `obs_slog` feature, a terminal slog observer follows
///   every iteration.
///
/// Errors
/// ------
/// - Argmin runtime errors (including errors raised by the density inside
///   a line search), converted through `From<argmin::core::Error>`.
/// - Validation errors from [`OptimOutcome::new`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &ModeOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogDensity,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let fn_evals = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        fn_evals,
        grad,
    )
}

fn log_initial_state<F: LogDensity>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) {
    let ell0 = problem.cost(theta0).map(|c| -c).ok();
    let grad_norm = problem.gradient(theta0).ok().map(|g| g.l2_norm());
    tracing::debug!(?ell0, ?grad_norm, "mode finder start");
}
