//! sampler — multi-chain hybrid MCMC for the change-point posterior.
//!
//! Purpose
//! -------
//! Draw from `p(tau, mu_before, mu_after, sigma | y)` with a two-block
//! scheme: static HMC on the continuous block in unconstrained space, then
//! a discrete update of `tau`. Chains run in parallel and are returned in
//! chain order.
//!
//! Key behaviors
//! -------------
//! - [`sample`] / [`sample_with_cancel`] validate [`SamplerOptions`], run
//!   `chains` independent chains with rayon, and collect a
//!   [`PosteriorSampleSet`].
//! - Warm-up adapts the step size by dual averaging and a diagonal mass
//!   matrix from one Welford window ([`adapt`]); warm-up draws are
//!   discarded.
//! - Divergent retained transitions are counted per chain; exceeding the
//!   allowance fails the run with `SamplerError::SamplingDivergence`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output is a pure function of the model, the options, and the seed.
//!   Thread count and scheduling do not affect it.
//! - Chains share only immutable references to the model and options.
//!
//! Conventions
//! -----------
//! - No I/O. Progress is reported through `tracing` (`info` per run and
//!   chain, `warn` on divergence stops and failed mode searches, `debug`
//!   for adaptation milestones).
//!
//! Testing notes
//! -------------
//! - Unit tests check kernels in isolation (Gaussian moments for HMC,
//!   exact conditional frequencies for tau) and bookkeeping per chain.
//! - Integration tests check recovery of a planted break and convergence
//!   diagnostics.

pub mod adapt;
pub mod api;
pub mod chain;
pub mod errors;
pub mod hmc;
pub mod options;
pub mod tau;
pub mod trace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{CancelToken, sample, sample_with_cancel};
pub use self::errors::{SamplerError, SamplerResult};
pub use self::options::{InitStrategy, SamplerOptions, TauStep};
pub use self::trace::{ChainStats, ChainTrace, Param, PosteriorSampleSet};
