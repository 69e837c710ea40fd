use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

use crate::api::{AuthToken, Transport};
use crate::clusters::ClusterRecord;
use crate::config::{JobStatus, ReportConfig};
use crate::insights::{dedup_titles, fetch_insight_titles};
use crate::utils::{format_decimal, format_milliseconds, round_to_cents};

pub const BLANK: &str = "-";

/// One CSV line: a cluster's projected fields plus one of its insights.
/// `None` cells are written empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Cluster Name")]
    pub cluster_name: Option<String>,
    #[serde(rename = "Job Name")]
    pub job_name: Option<String>,
    #[serde(rename = "Cluster Type")]
    pub cluster_type: Option<String>,
    #[serde(rename = "User")]
    pub user: Option<String>,
    #[serde(rename = "Workspace")]
    pub workspace: Option<String>,
    #[serde(rename = "Start Time")]
    pub start_time: Option<String>,
    #[serde(rename = "Setup Duration")]
    pub setup_duration: Option<String>,
    #[serde(rename = "Duration")]
    pub duration: Option<String>,
    #[serde(rename = "Cost")]
    pub cost: Option<String>,
    #[serde(rename = "DBUs")]
    pub dbus: Option<String>,
    #[serde(rename = "Insights")]
    pub insight: Option<String>,
}

pub const HEADERS: [&str; 12] = [
    "Status",
    "Cluster Name",
    "Job Name",
    "Cluster Type",
    "User",
    "Workspace",
    "Start Time",
    "Setup Duration",
    "Duration",
    "Cost",
    "DBUs",
    "Insights",
];

fn text_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => BLANK.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => BLANK.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric value of a field; zero counts as missing.
fn numeric(value: Option<&Value>, field: &str) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(action = "parse", component = "report", field, value = %s, "Field is not numeric");
                None
            }
        },
        Value::Null => None,
        other => {
            warn!(action = "parse", component = "report", field, value = %other, "Field is not numeric");
            None
        }
    }?;
    (number != 0.0).then_some(number)
}

fn duration_cell(value: Option<&Value>, field: &str) -> Option<String> {
    let millis = numeric(value, field)?;
    if !millis.is_finite() || millis < 0.0 {
        warn!(action = "format", component = "report", field, value = millis, "Duration is not a positive millisecond count");
        return None;
    }
    Some(format_milliseconds(millis as u64))
}

/// Integers stay integers; floats are rounded to cents.
fn rounded_cell(value: Option<&Value>, field: &str) -> Option<String> {
    let number = numeric(value, field)?;
    if let Some(Value::Number(n)) = value {
        if n.is_i64() || n.is_u64() {
            return Some(n.to_string());
        }
    }
    match round_to_cents(number) {
        Some(rounded) => Some(format_decimal(rounded)),
        None => {
            warn!(action = "format", component = "report", field, value = number, "Value could not be rounded");
            None
        }
    }
}

/// `"2024-09-25 06:30:00"` becomes `"06:30:00, 2024-09-25"`.
fn reorder_start_time(raw: String) -> String {
    if raw == BLANK {
        return raw;
    }
    match raw.trim().split_once(char::is_whitespace) {
        Some((date, time)) => format!("{}, {}", time.trim_start(), date),
        None => raw,
    }
}

fn status_cell(record: &ClusterRecord) -> String {
    let status = text_cell(record.status_long.as_ref());
    if status != BLANK {
        return status;
    }
    record
        .status
        .as_ref()
        .and_then(Value::as_str)
        .and_then(JobStatus::from_code)
        .map(|status| status.long_name().to_string())
        .unwrap_or(status)
}

/// Renames and formats a record's fields. The insight cell is left empty.
pub fn project(record: &ClusterRecord) -> ReportRow {
    ReportRow {
        status: Some(status_cell(record)),
        cluster_name: Some(text_cell(record.name.as_ref())),
        job_name: Some(text_cell(record.run_name.as_ref())),
        cluster_type: Some(text_cell(record.cluster_type.as_ref())),
        user: Some(text_cell(record.raw_user.as_ref())),
        workspace: Some(text_cell(record.queue.as_ref())),
        start_time: Some(reorder_start_time(text_cell(record.start_time.as_ref()))),
        setup_duration: duration_cell(record.setup_duration.as_ref(), "setupDuration"),
        duration: duration_cell(record.duration_long.as_ref(), "duration_long"),
        cost: rounded_cell(record.cost.as_ref(), "cost"),
        dbus: rounded_cell(record.dbus.as_ref(), "dbus"),
        insight: None,
    }
}

/// One row per title. Without titles the cluster is dropped unless
/// `include_empty` asks for a single row with no insight.
pub fn expand(projected: ReportRow, titles: Vec<String>, include_empty: bool) -> Vec<ReportRow> {
    if titles.is_empty() {
        return if include_empty { vec![projected] } else { Vec::new() };
    }
    titles
        .into_iter()
        .map(|title| ReportRow {
            insight: Some(title),
            ..projected.clone()
        })
        .collect()
}

/// Enriches every record with its insights and flattens the result.
pub fn build_rows<T: Transport + ?Sized>(
    transport: &T,
    token: &AuthToken,
    records: &[ClusterRecord],
    config: &ReportConfig,
) -> Vec<ReportRow> {
    let start_time = Instant::now();
    info!(action = "start", component = "report", clusters = records.len(), "Collecting cluster insights");

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in records {
        let projected = project(record);

        let titles = match record.cluster_ref() {
            Some(cluster) => fetch_insight_titles(transport, token, &cluster),
            None => {
                warn!(action = "enrich", component = "report", cluster_name = ?projected.cluster_name, "Record has no clusterUid/id; skipping insights");
                Vec::new()
            }
        };
        let titles = if config.keep_duplicate_insights {
            titles
        } else {
            dedup_titles(titles)
        };

        if titles.is_empty() && !config.include_clusters_without_insights {
            dropped += 1;
        }
        rows.extend(expand(projected, titles, config.include_clusters_without_insights));
    }

    info!(
        action = "complete",
        component = "report",
        rows = rows.len(),
        clusters_without_insights = dropped,
        duration_ms = start_time.elapsed().as_millis(),
        "Flattened clusters into report rows"
    );
    rows
}
