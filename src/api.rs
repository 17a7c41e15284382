// API client module: a small blocking HTTP client that posts one JSON body
// to a chat endpoint and hands back the raw status and body text. Knowing
// what the body means is the job of `provider`; this module only moves bytes.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ChatError;

/// One outgoing chat request: target URL, extra headers and the JSON body.
/// `Content-Type: application/json` is added by the transport.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Status and body of a response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can deliver a `ChatRequest` and return the response. The
/// chat session only talks to this trait, so tests can swap in a fake.
pub trait HttpTransport {
    fn post_json(&self, request: &ChatRequest) -> Result<RawResponse, ChatError>;
}

/// Blocking reqwest client with a fixed per-request timeout.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client })
    }
}

/// Turn the request's header pairs into a `HeaderMap`. Header names are
/// static lowercase strings; values come from user input and may be invalid.
fn header_map(pairs: &[(&'static str, String)]) -> Result<HeaderMap, ChatError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            ChatError::InvalidRequest(format!("header '{}' has an invalid value", name))
        })?;
        headers.insert(HeaderName::from_static(*name), value);
    }
    Ok(headers)
}

impl HttpTransport for ApiClient {
    fn post_json(&self, request: &ChatRequest) -> Result<RawResponse, ChatError> {
        let headers = header_map(&request.headers)?;
        debug!(url = %request.url, "sending chat request");

        let res = self
            .client
            .post(&request.url)
            .headers(headers)
            .json(&request.body)
            .send()
            .map_err(|e| ChatError::Transport(describe(&e)))?;

        let status = res.status().as_u16();
        let body = res.text().map_err(|e| ChatError::Transport(describe(&e)))?;
        debug!(status, bytes = body.len(), "chat response received");
        Ok(RawResponse { status, body })
    }
}

// reqwest's Display for a timeout is just "error sending request"; say so plainly.
fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    }
}
