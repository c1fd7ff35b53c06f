//! Conversion aggregation by (date, channel).
//!
//! The conversions log is many rows per day; the activity tables are one row
//! per (date, channel). Grouping before the join is the one
//! correctness-critical step: joining raw conversion rows against daily
//! activity would fan activity rows out per conversion and inflate every
//! downstream ratio.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use metrics_core::models::{Channel, ConversionAggregate, ConversionRecord};

// ── ConversionAggregator ──────────────────────────────────────────────────────

/// Stateless helper that groups raw conversion rows into per-day aggregates.
pub struct ConversionAggregator;

impl ConversionAggregator {
    /// Aggregate raw rows into one [`ConversionAggregate`] per (date, channel).
    ///
    /// Revenue is summed over every row in the group; conversions count
    /// distinct `conversion_id`s, so rows sharing an id (line items of one
    /// conversion) are counted once.
    ///
    /// Returns aggregates sorted by (date, channel).
    pub fn aggregate(records: &[ConversionRecord]) -> Vec<ConversionAggregate> {
        // BTreeMap for automatically sorted keys.
        let mut groups: BTreeMap<(NaiveDate, Channel), GroupTotals> = BTreeMap::new();

        for record in records {
            let group = groups.entry((record.date, record.channel)).or_default();
            group.revenue += record.revenue;
            group.ids.insert(record.conversion_id.clone());
        }

        groups
            .into_iter()
            .map(|((date, channel), totals)| ConversionAggregate {
                date,
                channel,
                revenue: totals.revenue,
                conversions: totals.ids.len() as u64,
            })
            .collect()
    }
}

#[derive(Default)]
struct GroupTotals {
    revenue: f64,
    ids: HashSet<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn conversion(id: &str, d: NaiveDate, channel: Channel, revenue: f64) -> ConversionRecord {
        ConversionRecord {
            conversion_id: id.to_string(),
            date: d,
            channel,
            revenue,
        }
    }

    #[test]
    fn test_groups_by_date_and_channel() {
        let records = vec![
            conversion("a", date(2024, 1, 15), Channel::Ppc, 50.0),
            conversion("b", date(2024, 1, 15), Channel::Ppc, 25.0),
            conversion("c", date(2024, 1, 15), Channel::Email, 10.0),
            conversion("d", date(2024, 1, 16), Channel::Ppc, 30.0),
        ];

        let aggregates = ConversionAggregator::aggregate(&records);
        assert_eq!(aggregates.len(), 3);

        // Sorted keys: (15, Email), (15, PPC), (16, PPC).
        let ppc_15 = &aggregates[1];
        assert_eq!(ppc_15.date, date(2024, 1, 15));
        assert_eq!(ppc_15.channel, Channel::Ppc);
        assert_eq!(ppc_15.revenue, 75.0);
        assert_eq!(ppc_15.conversions, 2);
    }

    #[test]
    fn test_duplicate_id_counted_once_revenue_summed() {
        // Two rows with the same id are line items of one conversion: the
        // count deduplicates, the revenue does not.
        let records = vec![
            conversion("a", date(2024, 1, 1), Channel::Ppc, 50.0),
            conversion("a", date(2024, 1, 1), Channel::Ppc, 50.0),
        ];

        let aggregates = ConversionAggregator::aggregate(&records);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].conversions, 1);
        assert_eq!(aggregates[0].revenue, 100.0);
    }

    #[test]
    fn test_output_sorted_by_date_then_channel() {
        let records = vec![
            conversion("a", date(2024, 1, 16), Channel::Ppc, 1.0),
            conversion("b", date(2024, 1, 15), Channel::Social, 1.0),
            conversion("c", date(2024, 1, 15), Channel::Email, 1.0),
        ];

        let aggregates = ConversionAggregator::aggregate(&records);
        let keys: Vec<(NaiveDate, Channel)> =
            aggregates.iter().map(|a| (a.date, a.channel)).collect();
        assert_eq!(
            keys,
            vec![
                (date(2024, 1, 15), Channel::Email),
                (date(2024, 1, 15), Channel::Social),
                (date(2024, 1, 16), Channel::Ppc),
            ]
        );
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        // Re-grouping the aggregate rows by the same key changes nothing:
        // every key already appears exactly once.
        let records = vec![
            conversion("a", date(2024, 1, 15), Channel::Ppc, 50.0),
            conversion("b", date(2024, 1, 15), Channel::Ppc, 30.0),
            conversion("c", date(2024, 1, 16), Channel::Email, 20.0),
        ];
        let aggregates = ConversionAggregator::aggregate(&records);

        let mut regrouped: BTreeMap<(NaiveDate, Channel), ConversionAggregate> = BTreeMap::new();
        for agg in &aggregates {
            assert!(
                regrouped.insert((agg.date, agg.channel), agg.clone()).is_none(),
                "duplicate key in aggregate output"
            );
        }
        let regrouped: Vec<ConversionAggregate> = regrouped.into_values().collect();
        assert_eq!(regrouped, aggregates);
    }

    #[test]
    fn test_empty_input() {
        assert!(ConversionAggregator::aggregate(&[]).is_empty());
    }
}
