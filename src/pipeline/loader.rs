//! pipeline::loader — CSV sources for prices and events.
//!
//! Purpose
//! -------
//! Read `Date`/`Price` and `Date`/`Event` tables into string rows for the
//! series and event cleaners. Parsing of the field values happens there;
//! this module only locates columns and splits records.
//!
//! Key behaviors
//! -------------
//! - Header names are matched case-insensitively after trimming; extra
//!   columns are ignored and may appear in any order.
//! - A record that cannot be split (e.g. invalid UTF-8) or is too short is
//!   dropped like any other malformed row.
//! - A missing required column rejects the whole table as
//!   `SeriesError::DataFormat`.
//! - A missing event file is not an error: [`load_event_calendar`] warns and
//!   returns an empty calendar.
use crate::{
    events::EventCalendar,
    pipeline::errors::{PipelineError, PipelineResult},
    series::{PriceSeries, SeriesError},
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info, warn};

pub const DATE_COLUMN: &str = "Date";
pub const PRICE_COLUMN: &str = "Price";
pub const EVENT_COLUMN: &str = "Event";

/// Read `(date, value)` string rows from the two named columns of a CSV.
///
/// Errors
/// ------
/// - `PipelineError::Load` when the header row cannot be read.
/// - `PipelineError::Preprocess(SeriesError::DataFormat)` when either
///   column is absent.
pub fn read_rows<R: Read>(
    reader: R, source: &str, date_column: &str, value_column: &str,
) -> PipelineResult<Vec<(String, String)>> {
    let mut csv = ReaderBuilder::new().flexible(true).trim(Trim::All).from_reader(reader);
    let headers = csv
        .headers()
        .map_err(|e| PipelineError::Load { source: source.to_string(), reason: e.to_string() })?
        .clone();
    let date_idx = column_index(&headers, date_column, source)?;
    let value_idx = column_index(&headers, value_column, source)?;

    let mut rows = Vec::new();
    for (row, record) in csv.records().enumerate() {
        let fields = record
            .ok()
            .and_then(|r| Some((r.get(date_idx)?.to_string(), r.get(value_idx)?.to_string())));
        match fields {
            Some(pair) => rows.push(pair),
            None => debug!(source, row, "dropping unreadable CSV record"),
        }
    }
    Ok(rows)
}

fn column_index(headers: &StringRecord, name: &str, source: &str) -> PipelineResult<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name)).ok_or_else(|| {
        PipelineError::Preprocess(SeriesError::DataFormat {
            reason: format!("{source} has no `{name}` column"),
        })
    })
}

fn open(path: &Path) -> PipelineResult<File> {
    File::open(path).map_err(|e| PipelineError::Load {
        source: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load and clean a price CSV with `Date` and `Price` columns.
pub fn load_price_series(path: impl AsRef<Path>) -> PipelineResult<PriceSeries> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let rows = read_rows(open(path)?, &source, DATE_COLUMN, PRICE_COLUMN)?;
    let prices = PriceSeries::from_raw_rows(rows.iter().map(|(d, p)| (d, p)))?;
    info!(source = source.as_str(), rows = rows.len(), kept = prices.len(), "loaded prices");
    Ok(prices)
}

/// Load an event CSV with `Date` and `Event` columns.
///
/// A file that does not exist yields an empty calendar.
pub fn load_event_calendar(path: impl AsRef<Path>) -> PipelineResult<EventCalendar> {
    let path = path.as_ref();
    let source = path.display().to_string();
    if !path.exists() {
        warn!(source = source.as_str(), "event file not found; continuing without events");
        return Ok(EventCalendar::default());
    }
    let rows = read_rows(open(path)?, &source, DATE_COLUMN, EVENT_COLUMN)?;
    let calendar = EventCalendar::from_raw_rows(rows.iter().map(|(d, e)| (d, e)));
    info!(source = source.as_str(), rows = rows.len(), kept = calendar.len(), "loaded events");
    Ok(calendar)
}
