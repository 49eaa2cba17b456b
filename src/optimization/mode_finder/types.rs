//! mode_finder::types — numeric aliases and solver wiring.
//!
//! Everything in the optimizer speaks `ndarray` over `f64`; the aliases
//! below keep Argmin's generic parameters in one place.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient with the same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective. User code returns a log-density; the adapter negates it.
pub type Cost = f64;

/// Function-evaluation counters keyed by Argmin's counter names.
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
