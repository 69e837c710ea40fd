use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::api::Transport;
use crate::auth::authenticate;
use crate::clusters::fetch_clusters;
use crate::config::{Credentials, ReportConfig};
use crate::error::Result;
use crate::output::write_report;
use crate::report::build_rows;
use crate::window::PollWindow;

#[derive(Debug)]
pub struct ReportOutcome {
    pub clusters: usize,
    pub rows: usize,
    /// `None` when there was nothing to write or the write failed.
    pub output: Option<PathBuf>,
}

struct Stages {
    current: usize,
}

impl Stages {
    fn begin(&mut self, description: &str) {
        self.current += 1;
        println!("{}", banner(self.current, description, ""));
    }

    fn succeed(&self, description: &str) {
        println!("{}", banner(self.current, description, "SUCCESS"));
    }

    fn note(&self, message: &str) {
        println!("Stage {}:\t {}", self.current, message);
    }
}

fn banner(stage: usize, description: &str, status: &str) -> String {
    format!("Stage {:<6} {:<70} {:>10}", format!("{stage}:"), description, status)
        .trim_end()
        .to_string()
}

/// Runs the five report stages in order. Fatal errors stop the run before
/// any output is written; insight and CSV failures are logged and absorbed.
pub fn run_report<T: Transport + ?Sized>(
    config: &ReportConfig,
    credentials: &Credentials,
    transport: &T,
    now: DateTime<Utc>,
) -> Result<ReportOutcome> {
    let total_start_time = Instant::now();
    let mut stages = Stages { current: 0 };

    stages.begin("Validating Poll Frequency parameters");
    let window = PollWindow::new(config.poll_unit, config.poll_value)?.ending_at(now);
    stages.succeed("Validating Poll Frequency parameters");

    stages.begin("Generating authentication token");
    let token = authenticate(transport, credentials)?;
    stages.succeed("Generating authentication token");

    stages.begin("Collecting cluster details");
    let records = fetch_clusters(transport, &token, config, &window)?;
    stages.succeed("Collecting cluster details");

    stages.begin("Collecting cluster Insights");
    let rows = build_rows(transport, &token, &records, config);
    stages.succeed("Collecting cluster Insights");

    stages.begin("Writing final report data to CSV");
    let output = if rows.is_empty() {
        warn!(action = "skip", component = "csv_writer", clusters = records.len(), "No cluster had insights; nothing to write");
        stages.note("No report rows to write");
        None
    } else {
        stages.note(&format!("Writing {} rows of data to CSV", rows.len()));
        match write_report(&rows, &config.output_dir, &config.report_name, now) {
            Ok(path) => {
                stages.note(&format!("Successfully output data to:\t {:?}", path));
                stages.succeed("Writing final report data to CSV");
                Some(path)
            }
            Err(e) => {
                warn!(action = "write", component = "csv_writer", error = %format!("{e:#}"), "Failed to write report");
                stages.note(&format!("Failed to write data to CSV file in {:?}", config.output_dir));
                stages.note(&format!("Message:\t {e:#}"));
                None
            }
        }
    };

    info!(
        action = "complete",
        component = "pipeline",
        clusters = records.len(),
        rows = rows.len(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Report run finished"
    );

    Ok(ReportOutcome {
        clusters: records.len(),
        rows: rows.len(),
        output,
    })
}
