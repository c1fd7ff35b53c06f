//! CSV export of the daily and weekly aggregate tables.
//!
//! Output is fully deterministic: rows arrive pre-sorted from the merge and
//! rollup stages, and the serializer derives headers from the record structs,
//! so identical inputs produce byte-identical files.

use std::path::Path;

use metrics_core::error::{PipelineError, Result};
use metrics_core::models::{MergedRecord, WeeklyRecord};
use serde::Serialize;
use tracing::info;

/// Write the daily table (`date,channel,spend,clicks,impressions,
/// emails_sent,revenue,conversions`).
pub fn export_daily(path: &Path, records: &[MergedRecord]) -> Result<()> {
    write_csv(path, records)?;
    info!("wrote {} daily rows to {}", records.len(), path.display());
    Ok(())
}

/// Write the weekly table (`week_start,channel,spend,clicks,impressions,
/// emails_sent,revenue,conversions`).
pub fn export_weekly(path: &Path, records: &[WeeklyRecord]) -> Result<()> {
    write_csv(path, records)?;
    info!("wrote {} weekly rows to {}", records.len(), path.display());
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| PipelineError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    for record in records {
        writer.serialize(record).map_err(|e| PipelineError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    writer.flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
