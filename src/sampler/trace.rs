//! sampler::trace — retained draws and per-chain sampler statistics.
//!
//! Purpose
//! -------
//! Store post-warm-up draws chain by chain so downstream code can pool
//! them for point summaries or keep them separate for convergence
//! diagnostics.
//!
//! Invariants & assumptions
//! ------------------------
//! - Within a [`ChainTrace`], the four parameter vectors have one entry per
//!   retained draw, in iteration order.
//! - [`PosteriorSampleSet::new`] does not enforce equal chain lengths; the
//!   summarizer reports ragged sets.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Parameters of the change-point model, in trace order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Tau,
    MuBefore,
    MuAfter,
    Sigma,
}

impl Param {
    pub const ALL: [Param; 4] = [Param::Tau, Param::MuBefore, Param::MuAfter, Param::Sigma];

    pub fn name(&self) -> &'static str {
        match self {
            Param::Tau => "tau",
            Param::MuBefore => "mu_before",
            Param::MuAfter => "mu_after",
            Param::Sigma => "sigma",
        }
    }
}

/// Per-chain sampler behaviour over the retained draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Mean HMC acceptance probability.
    pub mean_accept_prob: f64,
    /// Share of tau updates that moved or, for exact draws, were taken.
    pub tau_acceptance_rate: f64,
    pub divergences: usize,
    /// Step size frozen at the end of warm-up.
    pub step_size: f64,
    /// Diagonal inverse mass used after warm-up.
    pub inv_mass: Vec<f64>,
}

/// Retained draws of a single chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTrace {
    pub tau: Vec<usize>,
    pub mu_before: Vec<f64>,
    pub mu_after: Vec<f64>,
    pub sigma: Vec<f64>,
    pub stats: ChainStats,
}

impl ChainTrace {
    pub(crate) fn with_capacity(draws: usize) -> Self {
        ChainTrace {
            tau: Vec::with_capacity(draws),
            mu_before: Vec::with_capacity(draws),
            mu_after: Vec::with_capacity(draws),
            sigma: Vec::with_capacity(draws),
            stats: ChainStats {
                mean_accept_prob: 0.0,
                tau_acceptance_rate: 0.0,
                divergences: 0,
                step_size: 0.0,
                inv_mass: Vec::new(),
            },
        }
    }

    pub(crate) fn push(&mut self, tau: usize, mu_before: f64, mu_after: f64, sigma: f64) {
        self.tau.push(tau);
        self.mu_before.push(mu_before);
        self.mu_after.push(mu_after);
        self.sigma.push(sigma);
    }

    /// Number of retained draws (length of the tau trace).
    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }

    /// Whether all four parameter vectors have the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.tau.len();
        self.mu_before.len() == n && self.mu_after.len() == n && self.sigma.len() == n
    }

    /// Draws of one parameter as `f64` (tau is converted).
    pub fn values(&self, param: Param) -> Vec<f64> {
        match param {
            Param::Tau => self.tau.iter().map(|&t| t as f64).collect(),
            Param::MuBefore => self.mu_before.clone(),
            Param::MuAfter => self.mu_after.clone(),
            Param::Sigma => self.sigma.clone(),
        }
    }
}

/// PosteriorSampleSet — retained draws of every chain, in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSampleSet {
    chains: Vec<ChainTrace>,
}

impl PosteriorSampleSet {
    pub fn new(chains: Vec<ChainTrace>) -> Self {
        PosteriorSampleSet { chains }
    }

    pub fn chains(&self) -> &[ChainTrace] {
        &self.chains
    }

    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Draws per chain, taken from the first chain.
    pub fn n_draws(&self) -> usize {
        self.chains.first().map_or(0, ChainTrace::len)
    }

    pub fn is_empty(&self) -> bool {
        self.chains.iter().all(ChainTrace::is_empty)
    }

    /// Pooled tau draws across chains.
    pub fn tau_draws(&self) -> Vec<usize> {
        self.chains.iter().flat_map(|c| c.tau.iter().copied()).collect()
    }

    /// Pooled draws of one parameter across chains.
    pub fn pooled(&self, param: Param) -> Vec<f64> {
        self.chains.iter().flat_map(|c| c.values(param)).collect()
    }

    /// `chains × draws` matrix of one parameter; `None` for ragged sets.
    pub fn matrix(&self, param: Param) -> Option<Array2<f64>> {
        let draws = self.n_draws();
        let flat = self.pooled(param);
        Array2::from_shape_vec((self.n_chains(), draws), flat).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(taus: &[usize]) -> ChainTrace {
        let mut t = ChainTrace::with_capacity(taus.len());
        for &tau in taus {
            t.push(tau, 0.1 * tau as f64, 0.2, 0.01);
        }
        t
    }

    #[test]
    fn matrix_keeps_chains_separate() {
        let set = PosteriorSampleSet::new(vec![trace(&[1, 2, 3]), trace(&[4, 5, 6])]);

        let m = set.matrix(Param::Tau).expect("rectangular");

        assert_eq!(m.shape(), &[2, 3]);
        assert_eq!(m[[1, 0]], 4.0);
        assert_eq!(set.tau_draws(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(set.pooled(Param::MuAfter).len(), 6);
    }

    #[test]
    fn ragged_sets_have_no_matrix() {
        let set = PosteriorSampleSet::new(vec![trace(&[1, 2, 3]), trace(&[4])]);

        assert!(set.matrix(Param::Sigma).is_none());
    }

    #[test]
    fn sample_set_serializes_with_named_fields() {
        let set = PosteriorSampleSet::new(vec![trace(&[7])]);

        let json = serde_json::to_value(&set).expect("serializable");

        assert_eq!(json["chains"][0]["tau"][0], 7);
        assert!(json["chains"][0]["stats"]["divergences"].is_number());
    }
}
