//! Bridge from a [`LogDensity`] to Argmin's `CostFunction` / `Gradient`.
//!
//! The cost is `c(θ) = -ℓ(θ)`. An analytic gradient is negated; without
//! one, or when [`GradientSource::FiniteDifference`] is requested, the cost
//! itself is finite-differenced (central first, forward as a retry), so no
//! sign flip is needed on that branch.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    mode_finder::{
        traits::{GradientSource, LogDensity},
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Argmin problem wrapping a density and the data it is conditioned on.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogDensity> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub gradient: GradientSource,
}

impl<'a, F: LogDensity> ArgMinAdapter<'a, F> {
    /// Adapter that uses the density's analytic gradient when it has one.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data, gradient: GradientSource::Analytic }
    }

    pub fn with_gradient(mut self, gradient: GradientSource) -> Self {
        self.gradient = gradient;
        self
    }
}

impl<F: LogDensity> CostFunction for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Output = Cost;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(-value)
    }
}

impl<F: LogDensity> Gradient for ArgMinAdapter<'_, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost.
    ///
    /// Finite-difference closures must return `f64`, so the first failed
    /// evaluation is parked in `closure_err` and surfaced after the sweep.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        let analytic = match self.gradient {
            GradientSource::Analytic => self.f.grad(theta, self.data),
            GradientSource::FiniteDifference => Err(OptError::GradientNotImplemented),
        };
        match analytic {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_fn = |theta: &Theta| -> f64 {
                    self.cost(theta).unwrap_or_else(|e| {
                        let mut slot = closure_err.borrow_mut();
                        if slot.is_none() {
                            *slot = Some(e);
                        }
                        f64::NAN
                    })
                };
                let central = theta.central_diff(&cost_fn);
                if closure_err.borrow().is_none() && validate_grad(&central, dim).is_ok() {
                    return Ok(central);
                }
                forward_diff_checked(theta, &cost_fn, &closure_err)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Forward-difference retry; returns the first evaluation error, if any.
fn forward_diff_checked<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&grad, theta.len())?;
    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign flips between log-density and cost.
    // - The finite-difference fallback when no analytic gradient exists.
    // - Propagation of non-finite densities as errors.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = −Σ (θᵢ − cᵢ)², no analytic gradient.
    struct Bowl;

    impl LogDensity for Bowl {
        type Data = Theta;

        fn value(&self, theta: &Theta, centre: &Theta) -> OptResult<Cost> {
            Ok(-(theta - centre).mapv(|d| d * d).sum())
        }

        fn check(&self, _theta: &Theta, _centre: &Theta) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient, the adapter returns the finite-difference
    // gradient of the cost, i.e. 2(θ − c).
    fn finite_difference_fallback_matches_cost_gradient() {
        // Arrange
        let centre = array![1.0, -2.0];
        let problem = ArgMinAdapter::new(&Bowl, &centre);
        let theta = array![0.0, 0.0];

        // Act
        let grad = problem.gradient(&theta).expect("finite gradient");
        let cost = problem.cost(&theta).expect("finite cost");

        // Assert
        assert_relative_eq!(cost, 5.0, epsilon = 1e-12);
        assert_relative_eq!(grad[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 4.0, epsilon = 1e-5);
    }

    /// Same bowl, but with a deliberately wrong analytic gradient.
    struct FlatGradBowl;

    impl LogDensity for FlatGradBowl {
        type Data = Theta;

        fn value(&self, theta: &Theta, centre: &Theta) -> OptResult<Cost> {
            Bowl.value(theta, centre)
        }

        fn check(&self, _theta: &Theta, _centre: &Theta) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _centre: &Theta) -> OptResult<Grad> {
            Ok(Theta::zeros(theta.len()))
        }
    }

    #[test]
    // Purpose
    // -------
    // Requesting finite differences bypasses an analytic gradient.
    fn finite_difference_source_overrides_analytic_gradient() {
        // Arrange
        let centre = array![1.0, -2.0];
        let theta = array![0.0, 0.0];
        let analytic = ArgMinAdapter::new(&FlatGradBowl, &centre);
        let numeric = ArgMinAdapter::new(&FlatGradBowl, &centre)
            .with_gradient(GradientSource::FiniteDifference);

        // Act
        let g_analytic = analytic.gradient(&theta).expect("finite gradient");
        let g_numeric = numeric.gradient(&theta).expect("finite gradient");

        // Assert
        assert_eq!(g_analytic, array![0.0, 0.0]);
        assert_relative_eq!(g_numeric[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(g_numeric[1], 4.0, epsilon = 1e-5);
    }

    #[test]
    fn non_finite_density_is_reported_as_error() {
        let centre = array![f64::INFINITY];
        let problem = ArgMinAdapter::new(&Bowl, &centre);

        let err = problem.cost(&array![0.0]).expect_err("non-finite cost");

        assert!(matches!(OptError::from(err), OptError::NonFiniteCost { .. }));
    }
}
