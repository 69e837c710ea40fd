use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

use crate::api::{AuthToken, Transport, SEARCH_PATH};
use crate::config::{AppType, JobStatus, ReportConfig};
use crate::error::{ReportError, Result};
use crate::window::TimeWindow;

/// One job/cluster execution as returned by the search endpoint. Projected
/// fields stay loosely typed; the report decides how to render each one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterRecord {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub status_long: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, rename = "runName")]
    pub run_name: Option<Value>,
    #[serde(default, rename = "clusterType")]
    pub cluster_type: Option<Value>,
    #[serde(default)]
    pub raw_user: Option<Value>,
    #[serde(default)]
    pub queue: Option<Value>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default, rename = "setupDuration")]
    pub setup_duration: Option<Value>,
    #[serde(default)]
    pub duration_long: Option<Value>,
    #[serde(default)]
    pub cost: Option<Value>,
    #[serde(default)]
    pub dbus: Option<Value>,
    #[serde(default, rename = "clusterUid")]
    pub cluster_uid: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// Identifies a job for the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRef {
    pub cluster_uid: String,
    pub id: String,
}

impl ClusterRecord {
    pub fn cluster_ref(&self) -> Option<ClusterRef> {
        Some(ClusterRef {
            cluster_uid: path_segment(self.cluster_uid.as_ref()?)?,
            id: path_segment(self.id.as_ref()?)?,
        })
    }
}

fn path_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    from: usize,
    size: usize,
    start_time: String,
    end_time: String,
    #[serde(rename = "appStatus")]
    app_status: &'a [JobStatus],
    #[serde(rename = "appTypes")]
    app_types: &'a [AppType],
    #[serde(rename = "queryOnFinishedTime")]
    query_on_finished_time: bool,
}

#[derive(Debug, Deserialize)]
struct SearchMetadata {
    #[serde(rename = "totalRecords", default)]
    total_records: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    metadata: SearchMetadata,
    #[serde(default)]
    results: Vec<ClusterRecord>,
}

#[derive(Debug, Deserialize)]
struct QueryErrorBody {
    #[serde(default)]
    error: Vec<QueryErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct QueryErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<QueryErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.into_iter().next())
        .and_then(|entry| entry.message)
        .unwrap_or_else(|| body.to_string())
}

fn fetch_page<T: Transport + ?Sized>(
    transport: &T,
    token: &AuthToken,
    config: &ReportConfig,
    window: &TimeWindow,
    from: usize,
) -> Result<SearchResponse> {
    let request = SearchRequest {
        from,
        size: config.page_size,
        start_time: window.start_zulu(),
        end_time: window.end_zulu(),
        app_status: &config.statuses,
        app_types: &config.app_types,
        query_on_finished_time: false,
    };
    let body = serde_json::to_string(&request).map_err(|source| ReportError::Decode {
        endpoint: SEARCH_PATH.to_string(),
        source,
    })?;

    let response = transport.post_json(SEARCH_PATH, token, body)?;
    match response.status {
        200 => {
            let parsed: SearchResponse =
                serde_json::from_str(&response.body).map_err(|source| ReportError::Decode {
                    endpoint: SEARCH_PATH.to_string(),
                    source,
                })?;
            if parsed.metadata.total_records == 0 {
                return Err(ReportError::NoResults);
            }
            Ok(parsed)
        }
        422 => Err(ReportError::QueryRejected {
            message: rejection_message(&response.body),
        }),
        405 => Err(ReportError::EndpointMisconfigured {
            endpoint: SEARCH_PATH.to_string(),
        }),
        status => Err(ReportError::UnexpectedResponse {
            endpoint: SEARCH_PATH.to_string(),
            status,
            body: response.body,
        }),
    }
}

/// Queries the search endpoint for every job in `window`.
///
/// Without `config.paginate` a single page of `config.page_size` records is
/// requested and anything beyond it is reported but not fetched.
pub fn fetch_clusters<T: Transport + ?Sized>(
    transport: &T,
    token: &AuthToken,
    config: &ReportConfig,
    window: &TimeWindow,
) -> Result<Vec<ClusterRecord>> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "cluster_search",
        start = %window.start_zulu(),
        end = %window.end_zulu(),
        page_size = config.page_size,
        "Searching for clusters"
    );

    let mut records: Vec<ClusterRecord> = Vec::new();
    let mut from = 0;
    let total = loop {
        let page = fetch_page(transport, token, config, window, from)?;
        let total = page.metadata.total_records;
        let received = page.results.len();
        records.extend(page.results);

        info!(action = "page", component = "cluster_search", from, received, total_records = total, "Received search page");

        if !config.paginate || received == 0 || records.len() as u64 >= total {
            break total;
        }
        from += received;
    };

    if (records.len() as u64) < total {
        warn!(
            action = "truncate",
            component = "cluster_search",
            total_records = total,
            fetched = records.len(),
            unfetched = total - records.len() as u64,
            "Search matched more records than were fetched; pass --paginate to fetch them all"
        );
    }

    info!(
        action = "complete",
        component = "cluster_search",
        clusters = records.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Fetched cluster details"
    );
    Ok(records)
}
