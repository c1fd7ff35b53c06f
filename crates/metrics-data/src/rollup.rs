//! Monday-anchored weekly rollup of the daily merged table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use metrics_core::models::{Channel, MergedRecord, WeeklyRecord};
use metrics_core::time_utils::week_start;

/// Sum daily rows into (week_start, channel) buckets.
///
/// Only additive metrics are summed here. Ratio KPIs at the weekly grain are
/// recomputed from these sums; averaging daily ratios across non-uniform
/// volumes would bias them.
pub fn rollup_weekly(daily: &[MergedRecord]) -> Vec<WeeklyRecord> {
    let mut weeks: BTreeMap<(NaiveDate, Channel), WeeklyRecord> = BTreeMap::new();

    for record in daily {
        let start = week_start(record.date);
        weeks
            .entry((start, record.channel))
            .or_insert_with(|| WeeklyRecord::new(start, record.channel))
            .add(record);
    }

    weeks.into_values().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
