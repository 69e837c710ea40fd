use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;

use cluster_insights::api::{analysis_path, SEARCH_PATH, SIGN_IN_PATH};
use cluster_insights::config::{parse_base_url, AppType, JobStatus};
use cluster_insights::error::Result;
use cluster_insights::report::HEADERS;
use cluster_insights::window::TimeUnit;
use cluster_insights::{
    run_report, ApiResponse, AuthToken, Credentials, ErrorCode, ReportConfig, ReportError,
    Transport,
};

#[derive(Default)]
struct ScriptedPlatform {
    responses: HashMap<String, ApiResponse>,
    requested: RefCell<Vec<String>>,
}

impl ScriptedPlatform {
    fn with(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(path.to_string(), ApiResponse::new(status, body));
        self
    }

    fn reply(&self, path: &str) -> ApiResponse {
        self.requested.borrow_mut().push(path.to_string());
        self.responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(404, ""))
    }
}

impl Transport for ScriptedPlatform {
    fn post_form(&self, path: &str, _form: &[(&str, &str)]) -> Result<ApiResponse> {
        Ok(self.reply(path))
    }

    fn post_json(&self, path: &str, _token: &AuthToken, _body: String) -> Result<ApiResponse> {
        Ok(self.reply(path))
    }

    fn get(&self, path: &str, _token: &AuthToken) -> Result<ApiResponse> {
        Ok(self.reply(path))
    }
}

fn config(output_dir: &std::path::Path) -> ReportConfig {
    ReportConfig {
        base_url: parse_base_url("https://monitor.example.com").unwrap(),
        poll_unit: TimeUnit::Days,
        poll_value: 7,
        statuses: JobStatus::ALL.to_vec(),
        app_types: vec![AppType::Spark],
        page_size: 10_000,
        paginate: false,
        keep_duplicate_insights: false,
        include_clusters_without_insights: false,
        output_dir: output_dir.to_path_buf(),
        report_name: "inefficient-cluster-costs".to_string(),
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: Some("analyst".to_string()),
        password: Some("secret".to_string()),
    }
}

const SEARCH_BODY: &str = r#"{
    "metadata": {"totalRecords": 2},
    "results": [
        {
            "status_long": "Success", "name": "job-cluster-1", "runName": "nightly-etl",
            "clusterType": "JOB", "raw_user": "ana", "queue": "analytics",
            "start_time": "2024-09-24 23:10:00", "setupDuration": 61000,
            "duration_long": 3661000, "cost": 4.567, "dbus": 1.2,
            "clusterUid": "c-1", "id": "j-1"
        },
        {
            "status_long": "Failed", "name": "job-cluster-2", "runName": "",
            "clusterType": "JOB", "raw_user": "ben", "queue": "",
            "start_time": "2024-09-25 01:00:00", "setupDuration": 0,
            "duration_long": 1000, "cost": 0, "dbus": 0,
            "clusterUid": "c-2", "id": "j-2"
        }
    ]
}"#;

const FIRST_INSIGHTS: &str = r#"{"insightsV2": [
    {"categories": {
        "Efficiency": {"instances": [{"title": "Over-provisioned executors"}]},
        "Bottlenecks": {"instances": [{"title": "Skewed stage"}, {"title": "Over-provisioned executors"}]}
    }}
]}"#;

#[test]
fn writes_one_row_per_insight_and_drops_clusters_without_insights() {
    let dir = tempfile::tempdir().unwrap();
    let platform = ScriptedPlatform::default()
        .with(SIGN_IN_PATH, 200, r#"{"token": "abc"}"#)
        .with(SEARCH_PATH, 200, SEARCH_BODY)
        .with(&analysis_path("c-1", "j-1"), 200, FIRST_INSIGHTS)
        .with(&analysis_path("c-2", "j-2"), 200, r#"{"insightsV2": []}"#);
    let now = Utc.with_ymd_and_hms(2024, 9, 25, 8, 0, 0).unwrap();

    let outcome = run_report(&config(dir.path()), &credentials(), &platform, now).unwrap();
    assert_eq!(outcome.clusters, 2);
    assert_eq!(outcome.rows, 2);

    let path = outcome.output.expect("report should be written");
    assert_eq!(
        path,
        dir.path()
            .join("inefficient-cluster-costs-2024-09-25_08.00.00.csv")
    );

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, HEADERS);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(&row[1], "job-cluster-1");
        assert_eq!(&row[6], "23:10:00, 2024-09-24");
        assert_eq!(&row[7], "1m 1s");
        assert_eq!(&row[8], "1h 1m 1s");
        assert_eq!(&row[9], "4.57");
    }
    assert_eq!(&rows[0][11], "Over-provisioned executors");
    assert_eq!(&rows[1][11], "Skewed stage");
}

#[test]
fn rejected_sign_in_stops_before_search() {
    let dir = tempfile::tempdir().unwrap();
    let platform = ScriptedPlatform::default()
        .with(SIGN_IN_PATH, 400, r#"{"message": "bad credentials"}"#)
        .with(SEARCH_PATH, 200, SEARCH_BODY);

    let err = run_report(&config(dir.path()), &credentials(), &platform, Utc::now()).unwrap_err();
    assert!(matches!(err, ReportError::InvalidCredentials));
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    assert_eq!(*platform.requested.borrow(), vec![SIGN_IN_PATH.to_string()]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn out_of_range_window_stops_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let platform = ScriptedPlatform::default();
    let mut config = config(dir.path());
    config.poll_value = 91;

    let err = run_report(&config, &credentials(), &platform, Utc::now()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::TimeOutOfBounds);
    assert!(platform.requested.borrow().is_empty());
}

#[test]
fn no_insights_anywhere_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let platform = ScriptedPlatform::default()
        .with(SIGN_IN_PATH, 200, r#"{"token": "abc"}"#)
        .with(SEARCH_PATH, 200, SEARCH_BODY);

    let outcome = run_report(&config(dir.path()), &credentials(), &platform, Utc::now()).unwrap();
    assert_eq!(outcome.rows, 0);
    assert!(outcome.output.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unwritable_output_directory_does_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "occupied").unwrap();

    let platform = ScriptedPlatform::default()
        .with(SIGN_IN_PATH, 200, r#"{"token": "abc"}"#)
        .with(SEARCH_PATH, 200, SEARCH_BODY)
        .with(&analysis_path("c-1", "j-1"), 200, FIRST_INSIGHTS);

    let outcome = run_report(
        &config(&blocker.join("reports")),
        &credentials(),
        &platform,
        Utc::now(),
    )
    .unwrap();
    assert_eq!(outcome.clusters, 2);
    assert_eq!(outcome.rows, 2);
    assert!(outcome.output.is_none());
    assert!(blocker.is_file());
}
