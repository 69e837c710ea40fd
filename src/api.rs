use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::info;
use url::Url;

use crate::error::Result;

pub const SIGN_IN_PATH: &str = "api/v1/webSignIn";
pub const SEARCH_PATH: &str = "api/v1/apps/unifiedsearch";

pub fn analysis_path(cluster_uid: &str, id: &str) -> String {
    format!("api/v1/spark/{cluster_uid}/{id}/1/analysis")
}

/// Bearer token returned by sign-in, already in `Authorization` form.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn from_token(token: &str) -> Self {
        Self(format!("JWT {token}"))
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Status and raw body of a response. Stages interpret the status
/// themselves, so non-2xx responses are not errors at this layer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Blocking access to the platform API. `path` is relative to the base URL.
pub trait Transport {
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<ApiResponse>;
    fn post_json(&self, path: &str, token: &AuthToken, body: String) -> Result<ApiResponse>;
    fn get(&self, path: &str, token: &AuthToken) -> Result<ApiResponse>;
}

pub struct HttpTransport {
    base_url: Url,
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = HttpClient::builder().build()?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

fn into_response(response: reqwest::blocking::Response) -> Result<ApiResponse> {
    let status = response.status().as_u16();
    let body = response.text()?;
    Ok(ApiResponse { status, body })
}

impl Transport for HttpTransport {
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        info!(action = "request", component = "http", method = "POST", url = %url, "Sending form request");
        let response = self.client.post(url).form(form).send()?;
        into_response(response)
    }

    fn post_json(&self, path: &str, token: &AuthToken, body: String) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        info!(action = "request", component = "http", method = "POST", url = %url, "Sending JSON request");
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, token.header_value())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;
        into_response(response)
    }

    fn get(&self, path: &str, token: &AuthToken) -> Result<ApiResponse> {
        let url = self.endpoint(path)?;
        info!(action = "request", component = "http", method = "GET", url = %url, "Sending request");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token.header_value())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()?;
        into_response(response)
    }
}
