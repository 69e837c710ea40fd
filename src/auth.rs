use serde::Deserialize;
use tracing::info;

use crate::api::{AuthToken, Transport, SIGN_IN_PATH};
use crate::config::Credentials;
use crate::error::{ReportError, Result};

#[derive(Debug, Deserialize)]
struct SignInResponse {
    #[serde(default)]
    token: Option<String>,
}

/// Exchanges credentials for a bearer token. One attempt, no retries.
pub fn authenticate<T: Transport + ?Sized>(
    transport: &T,
    credentials: &Credentials,
) -> Result<AuthToken> {
    info!(action = "start", component = "sign_in", "Requesting authentication token");

    // Missing credentials are left out of the form and rejected upstream.
    let mut form: Vec<(&str, &str)> = Vec::with_capacity(2);
    if let Some(username) = credentials.username.as_deref() {
        form.push(("username", username));
    }
    if let Some(password) = credentials.password.as_deref() {
        form.push(("password", password));
    }

    let response = transport.post_form(SIGN_IN_PATH, &form)?;
    match response.status {
        200 => {
            let parsed: SignInResponse =
                serde_json::from_str(&response.body).map_err(|source| ReportError::Decode {
                    endpoint: SIGN_IN_PATH.to_string(),
                    source,
                })?;
            match parsed.token.filter(|token| !token.is_empty()) {
                Some(token) => {
                    info!(action = "complete", component = "sign_in", "Authentication token generated");
                    Ok(AuthToken::from_token(&token))
                }
                None => Err(ReportError::UnexpectedResponse {
                    endpoint: SIGN_IN_PATH.to_string(),
                    status: response.status,
                    body: response.body,
                }),
            }
        }
        400 => Err(ReportError::InvalidCredentials),
        405 => Err(ReportError::EndpointMisconfigured {
            endpoint: SIGN_IN_PATH.to_string(),
        }),
        status => Err(ReportError::UnexpectedResponse {
            endpoint: SIGN_IN_PATH.to_string(),
            status,
            body: response.body,
        }),
    }
}
