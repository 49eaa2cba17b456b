//! statistical_tests — unit-root and stationarity tests for the exploratory
//! step.
//!
//! Purpose
//! -------
//! Check the premise of the change-point model: prices wander like an
//! integrated process while log-returns are stationary around a level that
//! may shift once. The tests here are descriptive; the pipeline reports them
//! but never stops on their outcome.
//!
//! Key behaviors
//! -------------
//! - [`AdfOutcome::adfuller`](adf::AdfOutcome::adfuller) runs the augmented
//!   Dickey–Fuller test with AIC lag selection and MacKinnon p-values.
//! - [`KpssOutcome::kpss`](kpss::KpssOutcome::kpss) runs the KPSS test
//!   around a constant with an automatic Bartlett bandwidth.
//! - [`StationarityReport`] bundles both for one series.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are checked by [`validate_series`]; no routine panics on short,
//!   non-finite or constant data.
//!
//! Conventions
//! -----------
//! - Errors are reported via [`StatTestError`] and the [`StatTestResult`]
//!   alias, converted to `PyValueError` at the Python boundary.
//! - Outcomes keep their fields private behind accessors and serialize with
//!   `serde` for the JSON report.
//!
//! Downstream usage
//! ----------------
//! - `pipeline::run` applies [`StationarityReport::run`] to the window's
//!   prices and log-returns and stores the results in `WindowStats`,
//!   logging instead of failing when a series is too short.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`adf`] and [`kpss`] pin statistics for fixed
//!   pseudo-random series and hand-computed cases; [`validation`] covers
//!   every rejection branch.

pub mod adf;
pub mod errors;
pub mod kpss;
pub mod stationarity;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::adf::{AdfCriticalValues, AdfOutcome};
pub use self::errors::{StatTestError, StatTestResult};
pub use self::kpss::{KpssCriticalValues, KpssOutcome};
pub use self::stationarity::StationarityReport;
pub use self::validation::validate_series;
