use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::api::{ApiResponse, AuthToken, Transport};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<String>,
}

/// Replays canned responses per path, answering 404 once a path runs dry.
#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<HashMap<String, VecDeque<ApiResponse>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(ApiResponse::new(status, body));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    fn answer(&self, method: &'static str, path: &str, body: Option<String>) -> ApiResponse {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.responses
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ApiResponse::new(404, "not found"))
    }
}

impl Transport for FakeTransport {
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let encoded = form
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        Ok(self.answer("POST", path, Some(encoded)))
    }

    fn post_json(&self, path: &str, _token: &AuthToken, body: String) -> Result<ApiResponse> {
        Ok(self.answer("POST", path, Some(body)))
    }

    fn get(&self, path: &str, _token: &AuthToken) -> Result<ApiResponse> {
        Ok(self.answer("GET", path, None))
    }
}
