//! pipeline — end-to-end change-point analysis.
//!
//! Purpose
//! -------
//! Wire the series cleaner, model, sampler, summarizer and event calendar
//! into one call, and expose the result as an [`ImpactSummary`] plus a flat
//! [`ImpactRecord`] for JSON or CSV output.
//!
//! Key behaviors
//! -------------
//! - [`analyze`] / [`analyze_rows`] run the stages in order and stop at the
//!   first structural failure with a stage-tagged [`PipelineError`].
//! - [`AnalysisOptions`] gathers every knob and deserializes from TOML with
//!   defaults for each field.
//! - [`loader`] reads price and event CSVs by column name.
//!
//! Invariants & assumptions
//! ------------------------
//! - A failed run never yields a partial or default change point.

pub mod errors;
pub mod loader;
pub mod options;
pub mod report;
pub mod run;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{PipelineError, PipelineResult, Stage};
pub use self::loader::{load_event_calendar, load_price_series, read_rows};
pub use self::options::{AnalysisOptions, ReportMode};
pub use self::report::{ImpactRecord, ImpactSummary};
pub use self::run::{AnalysisOutcome, WindowStats, analyze, analyze_rows, analyze_with_cancel};
