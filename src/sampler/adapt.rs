//! sampler::adapt — warm-up adaptation of step size and diagonal mass.
//!
//! Purpose
//! -------
//! Tune the HMC step size and the diagonal inverse mass matrix during the
//! discarded warm-up phase so retained transitions hit the target
//! acceptance rate.
//!
//! Key behaviors
//! -------------
//! - [`DualAveraging`] drives `ln ε` toward the target mean acceptance
//!   probability (γ = 0.05, t₀ = 10, κ = 0.75, shrinkage point `ln 10ε₀`).
//!   The averaged iterate `ε̄` is frozen at the end of warm-up.
//! - [`DiagonalWelford`] accumulates per-coordinate variances with
//!   Welford's update and returns them shrunk toward `1e-3`.
//! - [`WarmupSchedule`] splits warm-up into a fast initial buffer (15 %),
//!   one slow window feeding the mass estimate, and a terminal buffer
//!   (10 %). Short warm-ups (< 20 iterations) adapt the step size only.
//!
//! Invariants & assumptions
//! ------------------------
//! - Accept probabilities passed to [`DualAveraging::update`] lie in
//!   [0, 1]; divergent transitions report 0.
//! - Regularized variances are strictly positive.
use ndarray::Array1;

const DA_GAMMA: f64 = 0.05;
const DA_T0: f64 = 10.0;
const DA_KAPPA: f64 = 0.75;

/// Warm-ups shorter than this skip mass-matrix adaptation.
pub const MIN_TUNE_FOR_MASS: usize = 20;

const INIT_BUFFER_FRACTION: f64 = 0.15;
const TERM_BUFFER_FRACTION: f64 = 0.10;

/// Nesterov dual-averaging state for `ln ε`.
#[derive(Debug, Clone, PartialEq)]
pub struct DualAveraging {
    target: f64,
    mu: f64,
    log_step: f64,
    log_step_bar: f64,
    h_bar: f64,
    count: usize,
}

impl DualAveraging {
    pub fn new(initial_step: f64, target: f64) -> Self {
        DualAveraging {
            target,
            mu: (10.0 * initial_step).ln(),
            log_step: initial_step.ln(),
            log_step_bar: 0.0,
            h_bar: 0.0,
            count: 0,
        }
    }

    /// Feed one transition's acceptance probability; returns the step size
    /// to use next.
    pub fn update(&mut self, accept_prob: f64) -> f64 {
        self.count += 1;
        let t = self.count as f64;
        let w = 1.0 / (t + DA_T0);
        self.h_bar = (1.0 - w) * self.h_bar + w * (self.target - accept_prob);
        self.log_step = self.mu - t.sqrt() / DA_GAMMA * self.h_bar;
        let eta = t.powf(-DA_KAPPA);
        self.log_step_bar = eta * self.log_step + (1.0 - eta) * self.log_step_bar;
        self.log_step.exp()
    }

    pub fn current_step(&self) -> f64 {
        self.log_step.exp()
    }

    /// Averaged step size; falls back to the current iterate before the
    /// first update.
    pub fn final_step(&self) -> f64 {
        if self.count == 0 { self.current_step() } else { self.log_step_bar.exp() }
    }
}

/// Running per-coordinate mean and sum of squared deviations.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalWelford {
    count: usize,
    mean: Array1<f64>,
    m2: Array1<f64>,
}

impl DiagonalWelford {
    pub fn new(dim: usize) -> Self {
        DiagonalWelford { count: 0, mean: Array1::zeros(dim), m2: Array1::zeros(dim) }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn push(&mut self, x: &Array1<f64>) {
        self.count += 1;
        let n = self.count as f64;
        for ((mean, m2), &xi) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x.iter()) {
            let delta = xi - *mean;
            *mean += delta / n;
            *m2 += delta * (xi - *mean);
        }
    }

    /// Sample variance shrunk toward `1e-3`:
    /// `n/(n+5)·var + 1e-3·5/(n+5)`. `None` with fewer than 3 samples.
    pub fn regularized_variance(&self) -> Option<Array1<f64>> {
        if self.count < 3 {
            return None;
        }
        let n = self.count as f64;
        let weight = n / (n + 5.0);
        let shrink = 1e-3 * 5.0 / (n + 5.0);
        Some(self.m2.mapv(|m2| weight * m2 / (n - 1.0) + shrink))
    }
}

/// Iteration boundaries of the warm-up phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupSchedule {
    tune: usize,
    window: Option<(usize, usize)>,
}

impl WarmupSchedule {
    pub fn new(tune: usize) -> Self {
        if tune < MIN_TUNE_FOR_MASS {
            return WarmupSchedule { tune, window: None };
        }
        let init_buffer = (INIT_BUFFER_FRACTION * tune as f64).floor() as usize;
        let term_buffer = (TERM_BUFFER_FRACTION * tune as f64).floor() as usize;
        WarmupSchedule { tune, window: Some((init_buffer, tune - term_buffer)) }
    }

    pub fn is_warmup(&self, iteration: usize) -> bool {
        iteration < self.tune
    }

    /// Whether this iteration's state feeds the mass-matrix estimate.
    pub fn in_mass_window(&self, iteration: usize) -> bool {
        matches!(self.window, Some((start, end)) if (start..end).contains(&iteration))
    }

    /// Whether the mass window closes after this iteration.
    pub fn closes_mass_window(&self, iteration: usize) -> bool {
        matches!(self.window, Some((_, end)) if iteration + 1 == end)
    }

    /// Whether this is the last warm-up iteration.
    pub fn is_last_warmup(&self, iteration: usize) -> bool {
        self.tune > 0 && iteration + 1 == self.tune
    }
}
