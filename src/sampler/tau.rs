//! Discrete update of the break index with the continuous block held fixed.
//!
//! All three moves target the same full conditional,
//! `p(tau | y, μ₁, μ₂, σ) ∝ exp(−SSE(tau) / 2σ²)`, because the uniform
//! prior on `tau` is flat.
use crate::{changepoint::ChangePointModel, sampler::options::TauStep};
use rand::Rng;

/// Result of one tau update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TauMove {
    pub tau: usize,
    pub accepted: bool,
}

/// Apply `step` once from `tau`.
pub fn update_tau<R: Rng>(
    model: &ChangePointModel, step: TauStep, tau: usize, mu_before: f64, mu_after: f64,
    sigma: f64, rng: &mut R,
) -> TauMove {
    match step {
        TauStep::Conditional => {
            let tau = draw_conditional(model, mu_before, mu_after, sigma, rng);
            TauMove { tau, accepted: true }
        }
        TauStep::Uniform => {
            let proposal = rng.gen_range(0..model.n_obs());
            metropolis(model, tau, proposal, mu_before, mu_after, sigma, rng)
        }
        TauStep::Local { radius } => {
            let offset = rng.gen_range(1..=radius);
            let proposal = if rng.gen_bool(0.5) {
                tau.checked_add(offset)
            } else {
                tau.checked_sub(offset)
            };
            match proposal.filter(|&t| t < model.n_obs()) {
                Some(proposal) => metropolis(model, tau, proposal, mu_before, mu_after, sigma, rng),
                None => TauMove { tau, accepted: false },
            }
        }
    }
}

fn metropolis<R: Rng>(
    model: &ChangePointModel, tau: usize, proposal: usize, mu_before: f64, mu_after: f64,
    sigma: f64, rng: &mut R,
) -> TauMove {
    let log_ratio = model.tau_log_kernel(proposal, mu_before, mu_after, sigma)
        - model.tau_log_kernel(tau, mu_before, mu_after, sigma);
    let u: f64 = rng.gen();
    if log_ratio >= 0.0 || u.ln() < log_ratio {
        TauMove { tau: proposal, accepted: true }
    } else {
        TauMove { tau, accepted: false }
    }
}

/// Exact draw from the normalized conditional via log-sum-exp and an
/// inverse-CDF scan.
fn draw_conditional<R: Rng>(
    model: &ChangePointModel, mu_before: f64, mu_after: f64, sigma: f64, rng: &mut R,
) -> usize {
    let log_kernel = model.tau_log_conditional(mu_before, mu_after, sigma);
    let max = log_kernel.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let weights = log_kernel.mapv(|v| (v - max).exp());
    let total: f64 = weights.sum();
    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (tau, &w) in weights.iter().enumerate() {
        cumulative += w;
        if target < cumulative {
            return tau;
        }
    }
    // Rounding can leave `target` at the total; the last index with mass wins.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}
