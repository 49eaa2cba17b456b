//! series — price cleaning, log-returns, and descriptive statistics.
//!
//! Purpose
//! -------
//! Turn raw `(date, price)` rows into the log-return series consumed by the
//! change-point model. This is the only place in the crate that deals with
//! untrusted row-level input; everything downstream relies on the
//! invariants established here.
//!
//! Key behaviors
//! -------------
//! - [`PriceSeries`] cleans rows best-effort (drop, never fail, per row) and
//!   enforces chronological order without duplicate dates.
//! - [`LogReturnSeries`] is derived from a price series and aligned with its
//!   trailing dates.
//! - [`describe`] produces [`SeriesStats`] for exploratory summaries.
//! - [`parse`] holds the date and price field parsers shared with the event
//!   calendar.
//!
//! Invariants & assumptions
//! ------------------------
//! - Whole-input failures are reported via [`SeriesError`]; a malformed row
//!   is not an error.
//! - Fewer than two cleaned prices make log-returns impossible and surface
//!   as [`SeriesError::InsufficientData`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; the end-to-end pipeline tests in
//!   `tests/` exercise the series layer through CSV-like rows.

pub mod data;
pub mod errors;
pub mod parse;
pub mod stats;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{LogReturnSeries, PriceSeries};
pub use self::errors::{SeriesError, SeriesResult};
pub use self::stats::{SeriesStats, describe};
