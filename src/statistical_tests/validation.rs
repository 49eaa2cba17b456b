//! statistical_tests::validation — shared input guards for the stationarity
//! tests.
//!
//! Both tests need a minimum sample, finite values and at least two distinct
//! observations. [`validate_series`] checks all three in one pass so the
//! test routines can assume clean input.

use crate::statistical_tests::errors::{StatTestError, StatTestResult};

/// Validate a series before running a stationarity test.
///
/// Parameters
/// ----------
/// - `data`: `&[f64]`
///   Observations in time order.
/// - `required`: `usize`
///   Minimum number of observations the calling test needs.
///
/// Errors
/// ------
/// - `StatTestError::InsufficientData` when `data.len() < required`.
/// - `StatTestError::InvalidData` for the first non-finite element.
/// - `StatTestError::ConstantSeries` when every element equals the first.
pub fn validate_series(data: &[f64], required: usize) -> StatTestResult<()> {
    if data.len() < required {
        return Err(StatTestError::InsufficientData { required, found: data.len() });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(StatTestError::InvalidData { index, value });
    }
    if data.iter().all(|&v| v == data[0]) {
        return Err(StatTestError::ConstantSeries { n: data.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Every error branch of `validate_series` and the success path.
    // -------------------------------------------------------------------------

    #[test]
    fn short_series_is_rejected() {
        assert_eq!(
            validate_series(&[1.0, 2.0], 4).unwrap_err(),
            StatTestError::InsufficientData { required: 4, found: 2 }
        );
    }

    #[test]
    fn first_non_finite_value_is_reported() {
        let err = validate_series(&[1.0, f64::INFINITY, f64::NAN, 2.0], 2).unwrap_err();
        assert_eq!(err, StatTestError::InvalidData { index: 1, value: f64::INFINITY });
    }

    #[test]
    // Purpose
    // -------
    // A flat series is rejected; any variation at all passes.
    fn constant_series_is_rejected() {
        assert_eq!(
            validate_series(&[5.0; 6], 4).unwrap_err(),
            StatTestError::ConstantSeries { n: 6 }
        );
        assert!(validate_series(&[5.0, 5.0, 5.0, 5.000001], 4).is_ok());
    }
}
