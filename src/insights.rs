use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::api::{analysis_path, AuthToken, Transport};
use crate::clusters::ClusterRef;

/// Collects insight titles from an analysis document, in document order.
///
/// `insightsV2` is a list of `{categories: {key: {instances: [{title}]}}}`.
/// Instances under an empty category key are not insights and are skipped.
pub fn parse_insight_titles(document: &Value) -> Vec<String> {
    let Some(entries) = document.get("insightsV2").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut titles = Vec::new();
    for entry in entries {
        let Some(categories) = entry.get("categories").and_then(Value::as_object) else {
            continue;
        };
        for (category_key, category) in categories {
            if category_key.is_empty() {
                continue;
            }
            let instances = category
                .get("instances")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            titles.extend(
                instances
                    .iter()
                    .filter_map(|instance| instance.get("title").and_then(Value::as_str))
                    .map(str::to_string),
            );
        }
    }
    titles
}

/// Drops repeated titles, keeping the first occurrence of each.
pub fn dedup_titles(titles: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    titles
        .into_iter()
        .filter(|title| seen.insert(title.clone()))
        .collect()
}

/// Fetches the insight titles for one job. Any failure is logged and yields
/// an empty list so one bad job never stops the report.
pub fn fetch_insight_titles<T: Transport + ?Sized>(
    transport: &T,
    token: &AuthToken,
    cluster: &ClusterRef,
) -> Vec<String> {
    let path = analysis_path(&cluster.cluster_uid, &cluster.id);

    let response = match transport.get(&path, token) {
        Ok(response) => response,
        Err(e) => {
            warn!(action = "fetch", component = "insights", path = %path, error = %e, "Insight request failed");
            return Vec::new();
        }
    };

    if response.status != 200 {
        warn!(action = "fetch", component = "insights", path = %path, status = response.status, "Insight request returned non-success status");
        return Vec::new();
    }

    let document: Value = match serde_json::from_str(&response.body) {
        Ok(document) => document,
        Err(e) => {
            warn!(action = "parse", component = "insights", path = %path, error = %e, "Insight response is not valid JSON");
            return Vec::new();
        }
    };

    let titles = parse_insight_titles(&document);
    info!(action = "complete", component = "insights", path = %path, insight_count = titles.len(), "Fetched insights");
    titles
}
