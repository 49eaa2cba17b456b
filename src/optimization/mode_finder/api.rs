//! Entry point for maximizing a [`LogDensity`].
use crate::optimization::{
    errors::OptResult,
    mode_finder::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{GradientSource, LineSearcher, LogDensity, ModeOptions},
    },
};

/// Maximize `ℓ(θ | data)` with L-BFGS.
///
/// Behavior
/// --------
/// - Validates `(theta0, data)` through [`LogDensity::check`].
/// - Wraps the density in an [`ArgMinAdapter`] (cost `-ℓ`) using the
///   gradient source in `opts.gradient`.
/// - Builds the solver for `opts.line_searcher` and runs it.
///
/// Errors
/// ------
/// - Any error from `f.check`, the builders, or [`run_lbfgs`].
///
/// Example
/// -------
/// ```ignore
/// let tau = 120usize;
/// let out = maximize(&model, model.initial_theta(), &tau, &ModeOptions::default())?;
/// println!("conditional mode: {:?}", out.theta_hat);
/// ```
pub fn maximize<F: LogDensity>(
    f: &F, theta0: Theta, data: &F::Data, opts: &ModeOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data).with_gradient(opts.gradient);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
