//! summary::diagnostics — convergence checks across chains.
//!
//! Purpose
//! -------
//! Quantify whether independent chains agree and how much information the
//! pooled draws carry.
//!
//! Key behaviors
//! -------------
//! - [`split_rhat`] halves every chain (dropping a middle draw when the
//!   length is odd) and compares between- and within-chain variance.
//! - [`effective_sample_size`] combines per-chain autocovariances over the
//!   split chains and truncates the autocorrelation sum with Geyer's initial
//!   monotone positive sequence.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is a `chains × draws` matrix.
//! - Both functions return `None` when the quantity is undefined: fewer than
//!   four draws per chain, or zero within-chain variance (e.g. a break index
//!   that never moves).
use crate::sampler::{ChainStats, Param, PosteriorSampleSet};
use ndarray::{Array2, ArrayView1, Axis, s};
use serde::Serialize;

/// Convergence figures for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamDiagnostics {
    pub param: Param,
    pub r_hat: Option<f64>,
    pub ess: Option<f64>,
}

/// Diagnostics for a whole sample set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub params: Vec<ParamDiagnostics>,
    pub chains: Vec<ChainStats>,
    pub total_divergences: usize,
}

impl Diagnostics {
    /// Diagnostics for every model parameter of a rectangular sample set.
    pub fn from_samples(samples: &PosteriorSampleSet) -> Self {
        let params = Param::ALL
            .iter()
            .map(|&param| {
                let draws = samples.matrix(param);
                ParamDiagnostics {
                    param,
                    r_hat: draws.as_ref().and_then(split_rhat),
                    ess: draws.as_ref().and_then(effective_sample_size),
                }
            })
            .collect();
        let chains: Vec<ChainStats> = samples.chains().iter().map(|c| c.stats.clone()).collect();
        let total_divergences = chains.iter().map(|c| c.divergences).sum();
        Diagnostics { params, chains, total_divergences }
    }

    pub fn get(&self, param: Param) -> Option<&ParamDiagnostics> {
        self.params.iter().find(|d| d.param == param)
    }

    /// Largest finite R-hat over all parameters.
    pub fn max_r_hat(&self) -> Option<f64> {
        self.params.iter().filter_map(|d| d.r_hat).reduce(f64::max)
    }
}

/// Split each chain into two halves of equal length.
fn split_chains(draws: &Array2<f64>) -> Option<Array2<f64>> {
    let (m, n) = draws.dim();
    let half = n / 2;
    if m == 0 || half < 2 {
        return None;
    }
    let mut split = Array2::zeros((2 * m, half));
    for (c, chain) in draws.axis_iter(Axis(0)).enumerate() {
        split.row_mut(2 * c).assign(&chain.slice(s![..half]));
        split.row_mut(2 * c + 1).assign(&chain.slice(s![n - half..]));
    }
    Some(split)
}

fn sample_variance(x: ArrayView1<'_, f64>) -> f64 {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Mean within-chain variance `W` and the pooled variance estimate `var⁺`.
fn variance_components(chains: &Array2<f64>) -> Option<(f64, f64)> {
    let (m, n) = chains.dim();
    let within =
        chains.axis_iter(Axis(0)).map(sample_variance).sum::<f64>() / m as f64;
    if !(within > 0.0) {
        return None;
    }
    let means = chains.mean_axis(Axis(1))?;
    let between = n as f64 * sample_variance(means.view());
    let n = n as f64;
    Some((within, (n - 1.0) / n * within + between / n))
}

/// Split R-hat.
pub fn split_rhat(draws: &Array2<f64>) -> Option<f64> {
    let split = split_chains(draws)?;
    let (within, var_plus) = variance_components(&split)?;
    Some((var_plus / within).sqrt())
}

/// Autocovariance at `lag` with the biased `1/n` normalization.
fn autocovariance(x: ArrayView1<'_, f64>, mean: f64, lag: usize) -> f64 {
    let n = x.len();
    (0..n - lag).map(|i| (x[i] - mean) * (x[i + lag] - mean)).sum::<f64>() / n as f64
}

/// Bulk effective sample size of the pooled draws.
pub fn effective_sample_size(draws: &Array2<f64>) -> Option<f64> {
    let split = split_chains(draws)?;
    let (m, n) = split.dim();
    let (_, var_plus) = variance_components(&split)?;
    let means = split.mean_axis(Axis(1))?;
    let within_acov = |lag: usize| -> f64 {
        split
            .axis_iter(Axis(0))
            .zip(means.iter())
            .map(|(chain, &mean)| autocovariance(chain, mean, lag))
            .sum::<f64>()
            / m as f64
    };
    // Chains' acov at lag 0 uses 1/n; rescale to the unbiased W first.
    let acov0 = within_acov(0);
    let within = acov0 * n as f64 / (n as f64 - 1.0);
    let rho = |lag: usize| 1.0 - (within - within_acov(lag)) / var_plus;

    let mut sum_pairs = 0.0;
    let mut previous_pair = f64::INFINITY;
    let mut lag = 0;
    while lag + 1 < n {
        let pair = rho(lag) + rho(lag + 1);
        if pair < 0.0 {
            break;
        }
        let pair = pair.min(previous_pair);
        sum_pairs += pair;
        previous_pair = pair;
        lag += 2;
    }
    let total = (m * n) as f64;
    let tau_hat = (-1.0 + 2.0 * sum_pairs).max(1.0 / total.log10());
    Some(total / tau_hat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_xoshiro::Xoshiro256PlusPlus;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - R-hat ≈ 1 for independent draws from one distribution.
    // - R-hat ≫ 1 when chains sit at different locations.
    // - ESS near the draw count for white noise and far below it for a
    //   strongly autocorrelated AR(1) series.
    // - `None` for constant chains and too-short chains.
    // -------------------------------------------------------------------------

    fn iid(chains: usize, draws: usize, offset_per_chain: f64, seed: u64) -> Array2<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).expect("valid normal");
        Array2::from_shape_fn((chains, draws), |(c, _)| {
            normal.sample(&mut rng) + offset_per_chain * c as f64
        })
    }

    #[test]
    fn rhat_is_near_one_for_mixed_chains() {
        let draws = iid(4, 1000, 0.0, 1);

        let r = split_rhat(&draws).expect("defined");

        assert!((r - 1.0).abs() < 0.01, "r_hat = {r}");
    }

    #[test]
    fn rhat_flags_chains_at_different_locations() {
        let draws = iid(4, 500, 3.0, 2);

        let r = split_rhat(&draws).expect("defined");

        assert!(r > 1.5, "r_hat = {r}");
    }

    #[test]
    // Purpose
    // -------
    // White noise carries roughly one unit of information per draw; an AR(1)
    // with φ = 0.95 carries about (1 − φ)/(1 + φ) ≈ 0.026 per draw.
    fn ess_tracks_autocorrelation() {
        // Arrange
        let white = iid(4, 1000, 0.0, 3);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let normal = Normal::new(0.0, 1.0).expect("valid normal");
        let mut ar = Array2::zeros((4, 1000));
        for c in 0..4 {
            let mut x = 0.0;
            for t in 0..1000 {
                x = 0.95 * x + normal.sample(&mut rng);
                ar[[c, t]] = x;
            }
        }

        // Act
        let ess_white = effective_sample_size(&white).expect("defined");
        let ess_ar = effective_sample_size(&ar).expect("defined");

        // Assert
        assert!(ess_white > 3000.0 && ess_white < 5000.0, "ess_white = {ess_white}");
        assert!(ess_ar < 400.0, "ess_ar = {ess_ar}");
    }

    #[test]
    fn undefined_cases_return_none() {
        let constant = Array2::from_elem((4, 100), 7.0);
        let short = iid(4, 3, 0.0, 5);

        assert!(split_rhat(&constant).is_none());
        assert!(effective_sample_size(&constant).is_none());
        assert!(split_rhat(&short).is_none());
    }
}
