//! statistical_tests::stationarity — ADF and KPSS run side by side.
//!
//! The two tests have opposite nulls, so a series is reported as
//! stationary only when ADF rejects a unit root and KPSS keeps level
//! stationarity.
use crate::statistical_tests::{adf::AdfOutcome, errors::StatTestResult, kpss::KpssOutcome};
use serde::Serialize;

/// Both stationarity tests on one series, with default lag rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationarityReport {
    pub adf: AdfOutcome,
    pub kpss: KpssOutcome,
}

impl StationarityReport {
    /// Run ADF (AIC lag selection) and KPSS (automatic bandwidth) on `data`.
    ///
    /// Errors
    /// ------
    /// - The first `StatTestError` from either test; ADF runs first.
    pub fn run(data: &[f64]) -> StatTestResult<Self> {
        Ok(StationarityReport {
            adf: AdfOutcome::adfuller(data, None)?,
            kpss: KpssOutcome::kpss(data, None)?,
        })
    }

    /// ADF rejects a unit root and KPSS does not reject stationarity, both at
    /// level `alpha`.
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.adf.p_value() < alpha && self.kpss.p_value() >= alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::errors::StatTestError;

    fn pseudo_noise(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| {
                let v = (i as f64 * 12.9898).sin() * 43758.5453;
                v - v.floor() - 0.5
            })
            .collect()
    }

    #[test]
    // Purpose
    // -------
    // Returns-like noise is stationary; its cumulative sum (a price-like
    // level) is not.
    fn noise_is_stationary_and_its_level_is_not() {
        // Arrange
        let noise = pseudo_noise(300);
        let level: Vec<f64> = noise
            .iter()
            .scan(100.0, |acc, v| {
                *acc += v;
                Some(*acc)
            })
            .collect();

        // Act
        let on_noise = StationarityReport::run(&noise).expect("valid series");
        let on_level = StationarityReport::run(&level).expect("valid series");

        // Assert
        assert!(on_noise.is_stationary(0.05));
        assert!(!on_level.is_stationary(0.05));
    }

    #[test]
    fn short_series_fails_in_adf() {
        assert_eq!(
            StationarityReport::run(&[1.0, 2.0, 1.5]).unwrap_err(),
            StatTestError::InsufficientData { required: 4, found: 3 }
        );
    }
}
