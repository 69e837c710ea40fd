use clap::ValueEnum;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use url::Url;

use crate::args::Args;
use crate::error::Result;
use crate::window::TimeUnit;

pub const USERNAME_VAR: &str = "unravel_open_user";
pub const PASSWORD_VAR: &str = "unravel_open_pass";

/// Workload types understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Spark,
    Impala,
    Hive,
    Mr,
    Tez,
    Bigquery,
}

/// Job status codes, short form as sent to the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    #[serde(rename = "K")]
    Killed,
    #[serde(rename = "F")]
    Failed,
    #[serde(rename = "R")]
    Running,
    #[serde(rename = "S")]
    Success,
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "U")]
    Unknown,
    #[serde(rename = "W")]
    Waiting,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Killed,
        JobStatus::Failed,
        JobStatus::Running,
        JobStatus::Success,
        JobStatus::Pending,
        JobStatus::Unknown,
        JobStatus::Waiting,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "K" => Some(JobStatus::Killed),
            "F" => Some(JobStatus::Failed),
            "R" => Some(JobStatus::Running),
            "S" => Some(JobStatus::Success),
            "P" => Some(JobStatus::Pending),
            "U" => Some(JobStatus::Unknown),
            "W" => Some(JobStatus::Waiting),
            _ => None,
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            JobStatus::Killed => "Killed",
            JobStatus::Failed => "Failed",
            JobStatus::Running => "Running",
            JobStatus::Success => "Success",
            JobStatus::Pending => "Pending",
            JobStatus::Unknown => "Unknown",
            JobStatus::Waiting => "Waiting",
        }
    }
}

/// Sign-in credentials. Either half may be absent; the platform decides.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where credentials come from. Only environment variables are supported
/// today; a file-backed source would implement this trait.
pub trait CredentialSource {
    fn load(&self) -> Credentials;
}

#[derive(Debug, Clone)]
pub struct EnvCredentials {
    pub username_var: String,
    pub password_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            username_var: USERNAME_VAR.to_string(),
            password_var: PASSWORD_VAR.to_string(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn load(&self) -> Credentials {
        Credentials {
            username: env::var(&self.username_var).ok(),
            password: env::var(&self.password_var).ok(),
        }
    }
}

/// Everything a run needs, fixed before the first stage starts.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub base_url: Url,
    pub poll_unit: TimeUnit,
    pub poll_value: i64,
    pub statuses: Vec<JobStatus>,
    pub app_types: Vec<AppType>,
    pub page_size: usize,
    pub paginate: bool,
    pub keep_duplicate_insights: bool,
    pub include_clusters_without_insights: bool,
    pub output_dir: PathBuf,
    pub report_name: String,
}

impl ReportConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("Data").join(&args.report_name));

        Ok(Self {
            base_url: parse_base_url(&args.url)?,
            poll_unit: args.poll_unit,
            poll_value: args.poll_value,
            statuses: JobStatus::ALL.to_vec(),
            app_types: args.app_types.clone(),
            page_size: args.page_size,
            paginate: args.paginate,
            keep_duplicate_insights: args.keep_duplicates,
            include_clusters_without_insights: args.include_clusters_without_insights,
            output_dir,
            report_name: args.report_name.clone(),
        })
    }
}

/// Parses the platform URL so endpoint paths join under it rather than
/// replacing its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub fn validate_args(args: &Args) -> anyhow::Result<()> {
    if args.page_size == 0 {
        anyhow::bail!("--page-size must be greater than 0");
    }

    if args.report_name.trim().is_empty() {
        anyhow::bail!("--report-name must not be empty");
    }

    if args.app_types.is_empty() {
        anyhow::bail!("at least one --app-type is required");
    }

    Ok(())
}
