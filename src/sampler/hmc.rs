//! sampler::hmc — static-length Hamiltonian Monte Carlo over a [`LogDensity`].
//!
//! Purpose
//! -------
//! Move the continuous block `θ` with gradient information while the
//! density's conditioning data (the break index) stays fixed.
//!
//! Key behaviors
//! -------------
//! - Momentum `pᵢ ~ N(0, 1/Mᵢ⁻¹)` for a diagonal inverse mass `M⁻¹`.
//! - Velocity-Verlet leapfrog with `n_steps` steps of size `ε`.
//! - Metropolis correction on the Hamiltonian
//!   `H = −ℓ(θ) + ½ Σ Mᵢ⁻¹ pᵢ²`.
//! - A transition whose energy error exceeds [`MAX_ENERGY_ERROR`], or that
//!   meets a non-finite density or gradient, is divergent: the current
//!   state is kept and the acceptance probability is reported as 0.
//!
//! Conventions
//! -----------
//! - Density errors inside a trajectory are treated as divergence rather
//!   than propagated; input validity is established before the first
//!   transition.
use crate::optimization::mode_finder::{Grad, LogDensity, Theta};
use ndarray::Array1;
use rand::Rng;
use rand_distr::StandardNormal;

/// Energy error beyond which a trajectory is declared divergent.
pub const MAX_ENERGY_ERROR: f64 = 1000.0;

const MAX_STEP_SEARCH_ITERS: usize = 100;

/// A position with its cached log-density and gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct HmcPoint {
    pub theta: Theta,
    pub log_density: f64,
    pub grad: Grad,
}

impl HmcPoint {
    /// Evaluate `f` at `theta`; `None` unless value and gradient are finite.
    pub fn evaluate<F: LogDensity>(f: &F, data: &F::Data, theta: Theta) -> Option<Self> {
        let log_density = f.value(&theta, data).ok()?;
        let grad = f.grad(&theta, data).ok()?;
        if !log_density.is_finite() || grad.len() != theta.len() || grad.iter().any(|g| !g.is_finite())
        {
            return None;
        }
        Some(HmcPoint { theta, log_density, grad })
    }
}

/// Outcome of one HMC transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub point: HmcPoint,
    pub accept_prob: f64,
    pub accepted: bool,
    pub divergent: bool,
}

impl Transition {
    fn divergent(current: &HmcPoint) -> Self {
        Transition { point: current.clone(), accept_prob: 0.0, accepted: false, divergent: true }
    }
}

fn draw_momentum<R: Rng>(inv_mass: &Array1<f64>, rng: &mut R) -> Array1<f64> {
    inv_mass.mapv(|m| {
        let z: f64 = rng.sample(StandardNormal);
        z / m.sqrt()
    })
}

fn kinetic_energy(p: &Array1<f64>, inv_mass: &Array1<f64>) -> f64 {
    0.5 * p.iter().zip(inv_mass.iter()).map(|(&pi, &mi)| mi * pi * pi).sum::<f64>()
}

fn leapfrog<F: LogDensity>(
    f: &F, data: &F::Data, start: &HmcPoint, mut p: Array1<f64>, step_size: f64,
    inv_mass: &Array1<f64>, n_steps: usize,
) -> Option<(HmcPoint, Array1<f64>)> {
    let mut point = start.clone();
    for _ in 0..n_steps {
        p.scaled_add(0.5 * step_size, &point.grad);
        let theta = &point.theta + &(&p * inv_mass * step_size);
        point = HmcPoint::evaluate(f, data, theta)?;
        p.scaled_add(0.5 * step_size, &point.grad);
    }
    Some((point, p))
}

/// One static-length HMC transition from `current`.
pub fn transition<F: LogDensity, R: Rng>(
    f: &F, data: &F::Data, current: &HmcPoint, step_size: f64, inv_mass: &Array1<f64>,
    n_steps: usize, rng: &mut R,
) -> Transition {
    let p0 = draw_momentum(inv_mass, rng);
    let h0 = -current.log_density + kinetic_energy(&p0, inv_mass);
    let Some((proposal, p1)) = leapfrog(f, data, current, p0, step_size, inv_mass, n_steps) else {
        return Transition::divergent(current);
    };
    let h1 = -proposal.log_density + kinetic_energy(&p1, inv_mass);
    let energy_error = h1 - h0;
    if !energy_error.is_finite() || energy_error > MAX_ENERGY_ERROR {
        return Transition::divergent(current);
    }
    let accept_prob = (-energy_error).exp().min(1.0);
    let u: f64 = rng.gen();
    if u < accept_prob {
        Transition { point: proposal, accept_prob, accepted: true, divergent: false }
    } else {
        Transition { point: current.clone(), accept_prob, accepted: false, divergent: false }
    }
}

/// Log Metropolis ratio of a single leapfrog step; `-∞` on breakdown.
fn single_step_log_ratio<F: LogDensity, R: Rng>(
    f: &F, data: &F::Data, current: &HmcPoint, step_size: f64, inv_mass: &Array1<f64>,
    rng: &mut R,
) -> f64 {
    let p0 = draw_momentum(inv_mass, rng);
    let h0 = -current.log_density + kinetic_energy(&p0, inv_mass);
    match leapfrog(f, data, current, p0, step_size, inv_mass, 1) {
        Some((point, p1)) => {
            let log_ratio = h0 - (-point.log_density + kinetic_energy(&p1, inv_mass));
            if log_ratio.is_nan() { f64::NEG_INFINITY } else { log_ratio }
        }
        None => f64::NEG_INFINITY,
    }
}

/// Heuristic initial step size: double or halve `start` until the
/// one-step acceptance ratio crosses ½.
pub fn find_reasonable_step_size<F: LogDensity, R: Rng>(
    f: &F, data: &F::Data, current: &HmcPoint, inv_mass: &Array1<f64>, start: f64, rng: &mut R,
) -> f64 {
    let threshold = 0.5_f64.ln();
    let mut step_size = start;
    let grow = single_step_log_ratio(f, data, current, step_size, inv_mass, rng) > threshold;
    let factor = if grow { 2.0 } else { 0.5 };
    for _ in 0..MAX_STEP_SEARCH_ITERS {
        let candidate = step_size * factor;
        let log_ratio = single_step_log_ratio(f, data, current, candidate, inv_mass, rng);
        let crossed = if grow { log_ratio <= threshold } else { log_ratio > threshold };
        if crossed {
            return if grow { step_size } else { candidate };
        }
        step_size = candidate;
    }
    step_size
}
