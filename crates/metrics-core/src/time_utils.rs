use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::warn;

// ── Date parsing ──────────────────────────────────────────────────────────────

/// Plain-date formats accepted across the four input files, tried in order.
/// ISO first; the day-first forms cover the legacy exports.
const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Datetime formats some exports use for the date column; the time component
/// is discarded.
const DATETIME_FMTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a raw CSV field into a calendar date.
///
/// Returns `None` for empty strings or unrecognised formats. Callers decide
/// the failure policy; the loaders abort the source's load.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    warn!("could not parse date \"{}\"", value);
    None
}

// ── Week bucketing ────────────────────────────────────────────────────────────

/// The most recent Monday on or before `date`: the ISO week start that keys
/// the weekly rollup buckets.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
