use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

/// A single authored chat message recovered from a message archive.
///
/// Fields are private so a record cannot change after ingestion; use the
/// accessors to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    text: String,
    timestamp: DateTime<Tz>,
    sender: String,
}

impl MessageRecord {
    pub fn new(text: impl Into<String>, timestamp: DateTime<Tz>, sender: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp,
            sender: sender.into(),
        }
    }

    /// Message body with escape runs already repaired.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Send time in the timezone chosen at ingestion.
    pub fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    /// Display name of the author.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Number of Unicode scalar values in the text.
    pub fn length(&self) -> u64 {
        self.text.chars().count() as u64
    }

    /// Calendar date of the message in its local timezone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Hour of day (0-23) in the local timezone.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_date(self.timestamp)
    }
}

// ── MonthKey ──────────────────────────────────────────────────────────────────

/// Monthly bucket key rendered as `"M-YY"`, e.g. `"3-24"` for March 2024.
///
/// Only the last two digits of the year are kept, so March 1924 and March
/// 2024 share a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    // Field order gives chronological ordering within a century.
    short_year: u32,
    month: u32,
}

impl MonthKey {
    /// Build a key from any date-like value.
    pub fn from_date(date: impl Datelike) -> Self {
        Self {
            short_year: date.year().rem_euclid(100) as u32,
            month: date.month(),
        }
    }

    /// Month number, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Year modulo 100.
    pub fn short_year(&self) -> u32 {
        self.short_year
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.month, self.short_year)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── ActivityMetrics ───────────────────────────────────────────────────────────

/// Character totals per day, per hour of day, and per month.
///
/// Buckets with no messages have no entry. Every map iterates in ascending
/// key order; for `hourly` that is 0 through 23.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityMetrics {
    pub daily: BTreeMap<NaiveDate, u64>,
    pub hourly: BTreeMap<u32, u64>,
    pub monthly: BTreeMap<MonthKey, u64>,
}

impl ActivityMetrics {
    /// Sum of message lengths across all records aggregated.
    pub fn total_characters(&self) -> u64 {
        self.daily.values().sum()
    }

    /// `true` when no record contributed to any view.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.hourly.is_empty() && self.monthly.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
