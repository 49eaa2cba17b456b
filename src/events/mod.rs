//! events — association of an estimated break with a market event.
//!
//! The calendar is advisory: an empty or unusable calendar yields no match
//! rather than an error, so the inference result stands on its own.

pub mod calendar;

pub use self::calendar::{EventCalendar, EventMatch, MarketEvent};
