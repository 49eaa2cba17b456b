//! series::parse — best-effort field parsers for raw price and event rows.
//!
//! Historical commodity files mix several date layouts (ISO dates, the
//! `20-May-87` layout of the EIA Brent export, `Apr 22, 2020` from later
//! appends). Each parser returns `None` for anything it cannot read; callers
//! drop such rows instead of failing.
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date layouts tried in order. Two-digit years follow chrono's `%y`
/// convention: 00 to 68 map to 2000-2068, 69 to 99 map to 1969-1999.
const DATE_FORMATS: [&str; 7] =
    ["%Y-%m-%d", "%d-%b-%y", "%d-%b-%Y", "%b %d, %Y", "%m/%d/%Y", "%Y/%m/%d", "%Y%m%d"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a calendar date from one of the supported layouts.
///
/// Leading and trailing whitespace is ignored. Timestamps (RFC 3339 or naive
/// `YYYY-MM-DD[T ]HH:MM:SS`) are truncated to their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date());
        }
    }
    None
}

/// Parse a strictly positive, finite price.
///
/// Thousands separators (`,`) are stripped before parsing.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let value: f64 = cleaned.parse().ok()?;
    is_valid_price(value).then_some(value)
}

/// `true` when `value` can enter a log-return (finite and > 0).
#[inline]
pub fn is_valid_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
