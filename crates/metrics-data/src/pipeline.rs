//! Top-level pipeline for campaign-metrics.
//!
//! Orchestrates loading, conversion aggregation, merging and the weekly
//! rollup, returning a [`PipelineResult`] ready for export and summary
//! display.

use chrono::Utc;
use metrics_core::error::Result;
use metrics_core::models::{MergedRecord, WeeklyRecord};
use metrics_core::settings::Settings;
use tracing::info;

use crate::aggregator::ConversionAggregator;
use crate::loader;
use crate::merger;
use crate::rollup;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the pipeline result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Rows loaded from `ppc_spend.csv`.
    pub ppc_rows: usize,
    /// Rows loaded from `email_campaigns.csv`.
    pub email_rows: usize,
    /// Rows loaded from `social_media_ads.csv`.
    pub social_rows: usize,
    /// Raw rows loaded from `website_conversions.csv`.
    pub conversion_rows: usize,
    /// (date, channel) groups after conversion aggregation.
    pub conversion_groups: usize,
    /// Conversion groups that matched no activity day (logged, dropped).
    pub unmatched_conversions: usize,
    /// Rows in the daily output table.
    pub daily_rows: usize,
    /// Rows in the weekly output table.
    pub weekly_rows: usize,
    /// Wall-clock seconds spent loading the CSV sources.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating, merging and rolling up.
    pub transform_time_seconds: f64,
}

/// The complete output of [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Daily merged table, one row per (date, channel), sorted.
    pub daily: Vec<MergedRecord>,
    /// Weekly rollup, one row per (week_start, channel), sorted.
    pub weekly: Vec<WeeklyRecord>,
    /// Metadata about this run.
    pub metadata: PipelineMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full aggregation pipeline.
///
/// 1. Load the three channel sources and the conversions log.
/// 2. Aggregate conversions by (date, channel).
/// 3. Stack the channel tables and left-join the aggregates.
/// 4. Roll the daily table up into Monday-anchored weeks.
///
/// Fails fast on a missing input file, a missing `date` column, or an
/// unparsable date; everything else degrades per the documented cleaning
/// policies.
pub fn run_pipeline(settings: &Settings) -> Result<PipelineResult> {
    let rates = settings.rates();

    // ── Step 1: Load sources ──────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let ppc = loader::load_ppc(&settings.ppc_file(), &rates)?;
    let email = loader::load_email(&settings.email_file(), &rates)?;
    let social = loader::load_social(&settings.social_file())?;
    let raw_conversions = loader::load_conversions(&settings.conversions_file())?;
    let load_time = load_start.elapsed().as_secs_f64();

    let (ppc_rows, email_rows, social_rows) = (ppc.len(), email.len(), social.len());
    let conversion_rows = raw_conversions.len();
    info!(
        "Loaded {} PPC, {} email, {} social activity rows and {} conversion rows",
        ppc_rows, email_rows, social_rows, conversion_rows
    );

    // ── Step 2: Aggregate conversions ─────────────────────────────────────────
    let transform_start = std::time::Instant::now();
    let conversions = ConversionAggregator::aggregate(&raw_conversions);

    // ── Step 3: Stack and merge ───────────────────────────────────────────────
    let activity = merger::stack_activity(ppc, email, social);
    let outcome = merger::merge(&activity, &conversions);

    // ── Step 4: Weekly rollup ─────────────────────────────────────────────────
    let weekly = rollup::rollup_weekly(&outcome.records);
    let transform_time = transform_start.elapsed().as_secs_f64();

    // ── Step 5: Build result ──────────────────────────────────────────────────
    let metadata = PipelineMetadata {
        generated_at: Utc::now().to_rfc3339(),
        ppc_rows,
        email_rows,
        social_rows,
        conversion_rows,
        conversion_groups: conversions.len(),
        unmatched_conversions: outcome.unmatched_conversions,
        daily_rows: outcome.records.len(),
        weekly_rows: weekly.len(),
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    Ok(PipelineResult {
        daily: outcome.records,
        weekly,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;
    use metrics_core::error::PipelineError;
    use metrics_core::models::Channel;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) {
        let path = dir.join(name);
        let mut file = std::fs::File::create(path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings_for(dir: &TempDir) -> Settings {
        Settings::parse_from([
            "campaign-metrics",
            "--data-path",
            dir.path().to_str().unwrap(),
        ])
    }

    /// A small but complete fixture: two days of activity on all three
    /// channels, conversions for some of them, one duplicate conversion id.
    fn write_fixture(dir: &TempDir) {
        write_csv(
            dir.path(),
            "ppc_spend.csv",
            &["date,spend", "2024-01-15,100.0", "2024-01-16,50.0"],
        );
        write_csv(
            dir.path(),
            "email_campaigns.csv",
            &[
                "date,emails_sent,clicks",
                "2024-01-15,1000,50",
                "2024-01-16,500,20",
            ],
        );
        write_csv(
            dir.path(),
            "social_media_ads.csv",
            &[
                "date,spend,impressions,clicks",
                "2024-01-15,20.0,5000,120",
                "2024-01-16,25.0,6000,150",
            ],
        );
        write_csv(
            dir.path(),
            "website_conversions.csv",
            &[
                "conversion_id,date,channel,revenue",
                "c-001,2024-01-15,PPC,50.0",
                "c-001,2024-01-15,PPC,50.0",
                "c-002,2024-01-15,Email,75.0",
                "c-003,2024-01-16,Social Media,40.0",
            ],
        );
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let result = run_pipeline(&settings_for(&dir)).unwrap();

        // 3 channels x 2 days.
        assert_eq!(result.daily.len(), 6);
        // All activity falls in the week of Monday 2024-01-15.
        assert_eq!(result.weekly.len(), 3);
        assert!(result.weekly.iter().all(|w| w.week_start == date(2024, 1, 15)));

        // PPC on the 15th: imputed clicks, deduplicated conversions, summed
        // duplicate revenue.
        let ppc = result
            .daily
            .iter()
            .find(|r| r.channel == Channel::Ppc && r.date == date(2024, 1, 15))
            .unwrap();
        assert_eq!(ppc.clicks, 50.0);
        assert_eq!(ppc.conversions, 1);
        assert_eq!(ppc.revenue, 100.0);

        // Email on the 15th: imputed spend from 1000 emails at $30 CPM.
        let email = result
            .daily
            .iter()
            .find(|r| r.channel == Channel::Email && r.date == date(2024, 1, 15))
            .unwrap();
        assert_eq!(email.spend, 30.0);
        assert_eq!(email.revenue, 75.0);

        // Social on the 15th had no conversions: explicit zero fill.
        let social = result
            .daily
            .iter()
            .find(|r| r.channel == Channel::Social && r.date == date(2024, 1, 15))
            .unwrap();
        assert_eq!(social.revenue, 0.0);
        assert_eq!(social.conversions, 0);

        // Legacy "Social Media" label joined onto the social channel.
        let social_16 = result
            .daily
            .iter()
            .find(|r| r.channel == Channel::Social && r.date == date(2024, 1, 16))
            .unwrap();
        assert_eq!(social_16.revenue, 40.0);
        assert_eq!(social_16.conversions, 1);
    }

    #[test]
    fn test_pipeline_metadata_counts() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let result = run_pipeline(&settings_for(&dir)).unwrap();
        let meta = &result.metadata;
        assert_eq!(meta.ppc_rows, 2);
        assert_eq!(meta.email_rows, 2);
        assert_eq!(meta.social_rows, 2);
        assert_eq!(meta.conversion_rows, 4);
        // (15, PPC), (15, Email), (16, Social).
        assert_eq!(meta.conversion_groups, 3);
        assert_eq!(meta.unmatched_conversions, 0);
        assert_eq!(meta.daily_rows, 6);
        assert_eq!(meta.weekly_rows, 3);
    }

    #[test]
    fn test_pipeline_no_duplicate_daily_keys() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let result = run_pipeline(&settings_for(&dir)).unwrap();
        let mut keys: Vec<(NaiveDate, Channel)> =
            result.daily.iter().map(|r| (r.date, r.channel)).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn test_pipeline_weekly_additivity() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let result = run_pipeline(&settings_for(&dir)).unwrap();
        for channel in Channel::ALL {
            let daily: u64 = result
                .daily
                .iter()
                .filter(|r| r.channel == channel)
                .map(|r| r.conversions)
                .sum();
            let weekly: u64 = result
                .weekly
                .iter()
                .filter(|r| r.channel == channel)
                .map(|r| r.conversions)
                .sum();
            assert_eq!(daily, weekly, "additivity broken for {channel}");
        }
    }

    #[test]
    fn test_pipeline_missing_input_fails_fast() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        std::fs::remove_file(dir.path().join("social_media_ads.csv")).unwrap();

        let err = run_pipeline(&settings_for(&dir)).unwrap_err();
        match err {
            PipelineError::InputNotFound(path) => {
                assert!(path.ends_with("social_media_ads.csv"));
            }
            other => panic!("expected InputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_pipeline_unmatched_conversions_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        // A conversion on a day with no activity at all.
        write_csv(
            dir.path(),
            "website_conversions.csv",
            &[
                "conversion_id,date,channel,revenue",
                "c-900,2023-12-01,PPC,10.0",
            ],
        );

        let result = run_pipeline(&settings_for(&dir)).unwrap();
        assert_eq!(result.metadata.unmatched_conversions, 1);
        assert_eq!(result.daily.len(), 6);
        assert!(result.daily.iter().all(|r| r.conversions == 0));
    }
}
