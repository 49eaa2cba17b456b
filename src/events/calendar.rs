//! Dated market events and nearest-event lookup.
use crate::series::parse::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A dated, described market event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub date: NaiveDate,
    pub description: String,
}

/// The event closest to a date and its distance in whole days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMatch {
    pub date: NaiveDate,
    pub description: String,
    pub days: i64,
}

/// EventCalendar — externally supplied events, ascending by date.
///
/// Events sharing a date keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCalendar {
    events: Vec<MarketEvent>,
}

impl EventCalendar {
    /// Build a calendar from `(date, description)` string rows.
    ///
    /// Rows with an unparseable date or a blank description are dropped.
    /// Unlike price cleaning this never fails: an all-bad input yields an
    /// empty calendar, and association simply finds nothing.
    pub fn from_raw_rows<I, D, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (D, T)>,
        D: AsRef<str>,
        T: AsRef<str>,
    {
        let events = rows
            .into_iter()
            .enumerate()
            .filter_map(|(row, (raw_date, text))| {
                let description = text.as_ref().trim();
                match parse_date(raw_date.as_ref()) {
                    Some(date) if !description.is_empty() => {
                        Some(MarketEvent { date, description: description.to_string() })
                    }
                    _ => {
                        debug!(row, date = raw_date.as_ref(), "dropping unusable event row");
                        None
                    }
                }
            })
            .collect();
        Self::from_events(events)
    }

    /// Build a calendar from typed events, sorting them by date.
    pub fn from_events(mut events: Vec<MarketEvent>) -> Self {
        events.sort_by_key(|e| e.date);
        EventCalendar { events }
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event with the smallest absolute day distance to `date`.
    ///
    /// Equidistant events resolve to the earlier one (the first in calendar
    /// order). Returns `None` for an empty calendar.
    pub fn nearest(&self, date: NaiveDate) -> Option<EventMatch> {
        // `min_by_key` keeps the first minimum, and events are sorted.
        self.events
            .iter()
            .map(|e| (e, (e.date - date).num_days().abs()))
            .min_by_key(|&(_, days)| days)
            .map(|(e, days)| EventMatch { date: e.date, description: e.description.clone(), days })
    }
}
