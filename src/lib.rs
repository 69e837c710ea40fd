pub mod api;
pub mod args;
pub mod auth;
pub mod clusters;
pub mod config;
pub mod error;
pub mod insights;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod window;

#[cfg(test)]
mod testing;

pub use api::{ApiResponse, AuthToken, HttpTransport, Transport};
pub use args::Args;
pub use config::{CredentialSource, Credentials, EnvCredentials, ReportConfig};
pub use error::{ErrorCode, ReportError};
pub use pipeline::{run_report, ReportOutcome};
pub use report::ReportRow;
