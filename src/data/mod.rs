//! Core data models for Tarkka Fetch
//!
//! This module contains the price snapshot stored in the result file, the
//! day boundary used to decide whether that snapshot is still current, and
//! the client and parser for the Tarkka price page.

pub mod parser;
pub mod tarkka;

pub use parser::{extract_prices, ParseError};
pub use tarkka::{FetchError, TarkkaClient, DEFAULT_PRICES_URL};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Number of hourly prices a complete day carries
pub const HOURS_PER_DAY: usize = 24;

/// Local midnight of a calendar day, in epoch milliseconds
///
/// Captured once at process start and used both to validate the cached
/// snapshot and to timestamp a freshly fetched one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayBoundary {
    millis: i64,
}

impl DayBoundary {
    /// Returns the boundary for the current local date
    pub fn today() -> Self {
        Self::of(&Local::now())
    }

    /// Returns the boundary of the calendar day `now` falls on, in `now`'s timezone
    ///
    /// When midnight does not exist on that date (a DST gap), the first
    /// full hour that does exist is used instead.
    pub fn of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let date = now.date_naive();

        let start = (0..24).find_map(|hour| {
            date.and_hms_opt(hour, 0, 0)
                .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        });

        Self {
            millis: start
                .map(|midnight| midnight.timestamp_millis())
                .unwrap_or_else(|| now.timestamp_millis()),
        }
    }

    /// Wraps a raw epoch-millisecond boundary
    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// The boundary in epoch milliseconds
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// Whether a snapshot stamped with `stamp` counts as data for this day
    ///
    /// Anything at or after the boundary is accepted, including stamps from
    /// a later day.
    pub fn is_current(&self, stamp: f64) -> bool {
        stamp >= self.millis as f64
    }
}

/// One day's hourly prices as stored in the result file
///
/// Serialized as `{"time": <epoch ms of local midnight>, "data": [<price>, ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Day boundary the prices belong to, in epoch milliseconds
    pub time: i64,
    /// Hourly prices in page order, nominally 24 entries
    pub data: Vec<f64>,
}

impl PriceSnapshot {
    /// Creates a snapshot of `prices` stamped with the given day
    pub fn new(day: DayBoundary, prices: Vec<f64>) -> Self {
        Self {
            time: day.millis(),
            data: prices,
        }
    }

    /// Whether the snapshot carries exactly one price per hour
    pub fn is_complete(&self) -> bool {
        self.data.len() == HOURS_PER_DAY
    }
}
