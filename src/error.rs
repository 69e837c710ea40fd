use thiserror::Error;

use crate::window::TimeUnit;

/// Fixed error table. `table_code` is printed with the failure message,
/// `exit_status` is what the process returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoResults,
    TimeOutOfBounds,
    UnknownApiError,
    InvalidCredentials,
    EndpointMisconfigured,
}

impl ErrorCode {
    pub fn table_code(self) -> u16 {
        match self {
            ErrorCode::NoResults => 0,
            ErrorCode::TimeOutOfBounds => 1,
            ErrorCode::UnknownApiError => 3,
            ErrorCode::InvalidCredentials => 400,
            ErrorCode::EndpointMisconfigured => 405,
        }
    }

    pub fn exit_status(self) -> i32 {
        match self {
            ErrorCode::NoResults => 2,
            ErrorCode::TimeOutOfBounds => 3,
            ErrorCode::UnknownApiError => 4,
            ErrorCode::InvalidCredentials => 5,
            ErrorCode::EndpointMisconfigured => 6,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::NoResults => "API: Your query returned 0 results",
            ErrorCode::TimeOutOfBounds => "Date/Time: Value Out of Bounds",
            ErrorCode::UnknownApiError => "API: Your query resulted in an unknown error state",
            ErrorCode::InvalidCredentials => "Authentication failed: Invalid credentials",
            ErrorCode::EndpointMisconfigured => {
                "API: Your target endpoint has an invalid configuration"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("value set for \"poll frequency\" ({value} {unit}) is outside the acceptable range ({min} - {max})")]
    PollWindowOutOfRange {
        unit: TimeUnit,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("sign-in rejected the supplied credentials")]
    InvalidCredentials,
    #[error("endpoint {endpoint} rejected the request method")]
    EndpointMisconfigured { endpoint: String },
    #[error("invalid platform url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("search returned 0 records for the requested window")]
    NoResults,
    #[error("search query rejected: {message}")]
    QueryRejected { message: String },
    #[error("{endpoint} responded with ({status}) {body}")]
    UnexpectedResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportError::PollWindowOutOfRange { .. } | ReportError::QueryRejected { .. } => {
                ErrorCode::TimeOutOfBounds
            }
            ReportError::InvalidCredentials => ErrorCode::InvalidCredentials,
            ReportError::EndpointMisconfigured { .. } | ReportError::InvalidUrl(_) => {
                ErrorCode::EndpointMisconfigured
            }
            ReportError::NoResults => ErrorCode::NoResults,
            ReportError::UnexpectedResponse { .. }
            | ReportError::Http(_)
            | ReportError::Decode { .. } => ErrorCode::UnknownApiError,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
