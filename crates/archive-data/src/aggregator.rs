//! Activity aggregation by day, hour of day and month.

use std::collections::BTreeMap;

use archive_core::models::{ActivityMetrics, MessageRecord, MonthKey};
use chrono::NaiveDate;

// ── ActivityAggregator ────────────────────────────────────────────────────────

/// Stateless helper that sums message lengths per time bucket.
pub struct ActivityAggregator;

impl ActivityAggregator {
    /// Build all three activity views from `records`.
    pub fn aggregate(records: &[MessageRecord]) -> ActivityMetrics {
        ActivityMetrics {
            daily: Self::aggregate_daily(records),
            hourly: Self::aggregate_hourly(records),
            monthly: Self::aggregate_monthly(records),
        }
    }

    /// Characters per local calendar date.
    pub fn aggregate_daily(records: &[MessageRecord]) -> BTreeMap<NaiveDate, u64> {
        Self::aggregate_by(records, MessageRecord::date)
    }

    /// Characters per local hour of day, keyed 0-23.
    pub fn aggregate_hourly(records: &[MessageRecord]) -> BTreeMap<u32, u64> {
        Self::aggregate_by(records, MessageRecord::hour)
    }

    /// Characters per `"M-YY"` month.
    pub fn aggregate_monthly(records: &[MessageRecord]) -> BTreeMap<MonthKey, u64> {
        Self::aggregate_by(records, MessageRecord::month_key)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic aggregation driver.
    ///
    /// A bucket exists once any record maps to it, even if every such
    /// record has empty text.
    fn aggregate_by<K: Ord>(
        records: &[MessageRecord],
        key_fn: impl Fn(&MessageRecord) -> K,
    ) -> BTreeMap<K, u64> {
        let mut map: BTreeMap<K, u64> = BTreeMap::new();
        for record in records {
            *map.entry(key_fn(record)).or_insert(0) += record.length();
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
