use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::report::ReportRow;

pub fn report_file_name(report_name: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "{}-{}.csv",
        report_name,
        generated_at.format("%Y-%m-%d_%H.%M.%S")
    )
}

/// Writes `rows` to a new timestamped CSV file under `output_dir`, header
/// first, and returns the file's path.
pub fn write_report(
    rows: &[ReportRow],
    output_dir: &Path,
    report_name: &str,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let start_time = Instant::now();
    if rows.is_empty() {
        anyhow::bail!("no report rows to write");
    }

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let path = output_dir.join(report_file_name(report_name, generated_at));
    info!(action = "start", component = "csv_writer", path = ?path, rows = rows.len(), "Writing report");

    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("Failed to create {:?}", path))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {:?}", path))?;

    info!(action = "complete", component = "csv_writer", path = ?path, duration_ms = start_time.elapsed().as_millis(), "Report written");
    Ok(path)
}
