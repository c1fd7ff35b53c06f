//! CSV loading for the four marketing sources.
//!
//! Each loader reads one source file into channel-tagged records with a
//! common numeric column superset. The cleaning policies are deliberate and
//! explicit:
//!
//! * a missing input file or `date` column aborts the load,
//! * an unparsable date aborts the load, naming the record; a silently
//!   dropped row would corrupt every aggregate derived from the file,
//! * a missing optional numeric column is created zero-filled,
//! * non-numeric garbage in a numeric cell fails closed to 0.0.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use metrics_core::error::{PipelineError, Result};
use metrics_core::models::{ActivityRecord, Channel, ConversionRecord};
use metrics_core::settings::BenchmarkRates;
use metrics_core::time_utils;
use tracing::debug;

// ── Column names ──────────────────────────────────────────────────────────────

const DATE_COL: &str = "date";
const SPEND_COL: &str = "spend";
const CLICKS_COL: &str = "clicks";
const IMPRESSIONS_COL: &str = "impressions";
const EMAILS_SENT_COL: &str = "emails_sent";
const CONVERSION_ID_COL: &str = "conversion_id";
const CHANNEL_COL: &str = "channel";
const REVENUE_COL: &str = "revenue";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the PPC spend file.
///
/// When the `clicks` column is absent or entirely empty, clicks are imputed
/// per row as `round(spend / rates.assumed_cpc)`.
pub fn load_ppc(path: &Path, rates: &BenchmarkRates) -> Result<Vec<ActivityRecord>> {
    let table = read_table(path)?;
    let date_idx = table.require_column(DATE_COL)?;
    let spend_idx = table.column_index(SPEND_COL);
    let clicks_idx = table.column_index(CLICKS_COL);
    let impute_clicks = !table.column_has_values(clicks_idx);

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let date = table.parse_row_date(date_idx, i + 1, row)?;
        let spend = numeric_or_zero(row, spend_idx);
        let clicks = if impute_clicks {
            (spend / rates.assumed_cpc).round()
        } else {
            numeric_or_zero(row, clicks_idx)
        };
        records.push(ActivityRecord {
            date,
            channel: Channel::Ppc,
            spend,
            clicks,
            impressions: 0.0,
            emails_sent: 0.0,
        });
    }

    debug!(
        "{}: {} PPC rows loaded (clicks imputed: {})",
        path.display(),
        records.len(),
        impute_clicks
    );
    Ok(records)
}

/// Load the email campaigns file.
///
/// When the `spend` column is absent or entirely empty, spend is imputed per
/// row as `emails_sent * rates.email_cpm / 1000`.
pub fn load_email(path: &Path, rates: &BenchmarkRates) -> Result<Vec<ActivityRecord>> {
    let table = read_table(path)?;
    let date_idx = table.require_column(DATE_COL)?;
    let emails_idx = table.column_index(EMAILS_SENT_COL);
    let clicks_idx = table.column_index(CLICKS_COL);
    let spend_idx = table.column_index(SPEND_COL);
    let impute_spend = !table.column_has_values(spend_idx);

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let date = table.parse_row_date(date_idx, i + 1, row)?;
        let emails_sent = numeric_or_zero(row, emails_idx);
        let spend = if impute_spend {
            emails_sent * rates.email_cpm / 1000.0
        } else {
            numeric_or_zero(row, spend_idx)
        };
        records.push(ActivityRecord {
            date,
            channel: Channel::Email,
            spend,
            clicks: numeric_or_zero(row, clicks_idx),
            impressions: 0.0,
            emails_sent,
        });
    }

    debug!(
        "{}: {} email rows loaded (spend imputed: {})",
        path.display(),
        records.len(),
        impute_spend
    );
    Ok(records)
}

/// Load the social media ads file. No imputation; all three numeric columns
/// are coerced with zero defaults.
pub fn load_social(path: &Path) -> Result<Vec<ActivityRecord>> {
    let table = read_table(path)?;
    let date_idx = table.require_column(DATE_COL)?;
    let spend_idx = table.column_index(SPEND_COL);
    let impressions_idx = table.column_index(IMPRESSIONS_COL);
    let clicks_idx = table.column_index(CLICKS_COL);

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let date = table.parse_row_date(date_idx, i + 1, row)?;
        records.push(ActivityRecord {
            date,
            channel: Channel::Social,
            spend: numeric_or_zero(row, spend_idx),
            clicks: numeric_or_zero(row, clicks_idx),
            impressions: numeric_or_zero(row, impressions_idx),
            emails_sent: 0.0,
        });
    }

    debug!("{}: {} social rows loaded", path.display(), records.len());
    Ok(records)
}

/// Raw row shape of the conversions log; dates and channels are validated
/// after deserialization so failures carry the record number.
#[derive(Debug, serde::Deserialize)]
struct RawConversionRow {
    conversion_id: String,
    date: String,
    channel: String,
    #[serde(default)]
    revenue: String,
}

/// Load the website conversions log.
///
/// All four columns are required; this file is the authoritative source of
/// revenue and conversion counts. Channel labels outside the fixed set abort
/// the load.
pub fn load_conversions(path: &Path) -> Result<Vec<ConversionRecord>> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    for column in [CONVERSION_ID_COL, DATE_COL, CHANNEL_COL, REVENUE_COL] {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(PipelineError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<RawConversionRow>().enumerate() {
        let row = result.map_err(|e| csv_error(path, e))?;
        let record = i + 1;

        let date = time_utils::parse_date(&row.date).ok_or_else(|| PipelineError::DateParse {
            path: path.to_path_buf(),
            record,
            value: row.date.clone(),
        })?;
        let channel =
            Channel::parse_label(&row.channel).ok_or_else(|| PipelineError::UnknownChannel {
                path: path.to_path_buf(),
                record,
                value: row.channel.clone(),
            })?;

        records.push(ConversionRecord {
            conversion_id: row.conversion_id,
            date,
            channel,
            revenue: coerce_numeric(&row.revenue),
        });
    }

    debug!(
        "{}: {} conversion rows loaded",
        path.display(),
        records.len()
    );
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// A fully buffered source file: trimmed headers plus data rows.
struct SourceTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl SourceTable {
    /// Case-insensitive header lookup.
    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    fn require_column(&self, name: &'static str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                path: self.path.clone(),
                column: name,
            })
    }

    /// Whether the column exists and holds at least one non-empty cell.
    /// An absent or all-empty column triggers imputation, matching the
    /// column-level rule of the source estimates.
    fn column_has_values(&self, index: Option<usize>) -> bool {
        let Some(idx) = index else {
            return false;
        };
        self.rows
            .iter()
            .any(|row| row.get(idx).is_some_and(|v| !v.trim().is_empty()))
    }

    fn parse_row_date(
        &self,
        date_idx: usize,
        record: usize,
        row: &csv::StringRecord,
    ) -> Result<NaiveDate> {
        let raw = row.get(date_idx).unwrap_or("");
        time_utils::parse_date(raw).ok_or_else(|| PipelineError::DateParse {
            path: self.path.clone(),
            record,
            value: raw.to_string(),
        })
    }
}

fn read_table(path: &Path) -> Result<SourceTable> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result.map_err(|e| csv_error(path, e))?);
    }

    Ok(SourceTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn csv_error(path: &Path, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Coerce a raw cell to f64; empty and non-numeric cells fail closed to 0.0.
fn coerce_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            debug!("non-numeric value \"{}\" coerced to 0.0", raw);
            0.0
        }
    }
}

fn numeric_or_zero(row: &csv::StringRecord, index: Option<usize>) -> f64 {
    match index {
        Some(idx) => coerce_numeric(row.get(idx).unwrap_or("")),
        None => 0.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
