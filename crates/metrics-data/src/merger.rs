//! Row-wise union of the channel tables and the activity-driven left join.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use metrics_core::models::{ActivityRecord, Channel, ConversionAggregate, MergedRecord};
use tracing::{debug, warn};

/// Stack the three channel tables into one long table. The records already
/// share the common column superset, so this is a plain row union.
pub fn stack_activity(
    ppc: Vec<ActivityRecord>,
    email: Vec<ActivityRecord>,
    social: Vec<ActivityRecord>,
) -> Vec<ActivityRecord> {
    let mut all = ppc;
    all.extend(email);
    all.extend(social);
    all
}

/// Result of [`merge`]: the joined daily rows plus the count of conversion
/// groups that found no activity row.
#[derive(Debug)]
pub struct MergeOutcome {
    /// One row per (date, channel), sorted by key.
    pub records: Vec<MergedRecord>,
    /// Conversion aggregates whose key matched no activity day. Logged and
    /// dropped; the left join never fabricates phantom activity rows.
    pub unmatched_conversions: usize,
}

/// Left-join conversion aggregates onto the stacked activity table, with
/// activity as the driving side.
///
/// Duplicate (date, channel) activity keys are collapsed by summing first,
/// so each key appears exactly once at the daily granularity. Activity days
/// without conversions keep explicit `revenue = 0.0, conversions = 0`
/// defaults rather than relying on implicit fill behavior.
pub fn merge(activity: &[ActivityRecord], conversions: &[ConversionAggregate]) -> MergeOutcome {
    let mut merged: BTreeMap<(NaiveDate, Channel), MergedRecord> = BTreeMap::new();

    for record in activity {
        merged
            .entry((record.date, record.channel))
            .and_modify(|row| row.absorb_activity(record))
            .or_insert_with(|| MergedRecord::from_activity(record));
    }

    let mut unmatched: Vec<(NaiveDate, Channel)> = Vec::new();
    for aggregate in conversions {
        match merged.get_mut(&(aggregate.date, aggregate.channel)) {
            Some(row) => {
                row.revenue = aggregate.revenue;
                row.conversions = aggregate.conversions;
            }
            None => unmatched.push((aggregate.date, aggregate.channel)),
        }
    }

    if !unmatched.is_empty() {
        warn!(
            "{} conversion group(s) had no matching activity day and were dropped: {:?}",
            unmatched.len(),
            unmatched
        );
    }
    debug!(
        "merged {} activity rows into {} daily rows ({} conversion groups attached)",
        activity.len(),
        merged.len(),
        conversions.len() - unmatched.len()
    );

    MergeOutcome {
        records: merged.into_values().collect(),
        unmatched_conversions: unmatched.len(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
