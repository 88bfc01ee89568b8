//! HTTP transport seam
//!
//! The gateway only needs "send this request, give me status and body", so
//! the network layer sits behind [`Transport`] and can be swapped out in
//! headless tests.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Backend operations the client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /api/search`
    Search,
    /// `POST /api/analyze`
    Analyze,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Search => "/api/search",
            Self::Analyze => "/api/analyze",
        }
    }

    /// Message used when the server reports failure without one
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Search => "搜索失败",
            Self::Analyze => "分析失败",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Query-string pairs, sent with GET
    Query(Vec<(String, String)>),
    /// JSON body, sent with POST
    Json(Value),
}

/// A fully described outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub endpoint: Endpoint,
    pub payload: Payload,
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the backend
///
/// An `Err` is a connection-level failure described as text; HTTP error
/// statuses are still `Ok` responses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<RawResponse, String>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url`
    ///
    /// A path prefix on the base URL is kept: `http://gw/valuation` sends
    /// searches to `http://gw/valuation/api/search`.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|e| {
            ClientError::ConfigError(format!("invalid base_url '{base_url}': {e}"))
        })?;
        let client = Client::builder().build()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, endpoint: Endpoint) -> std::result::Result<Url, String> {
        self.base_url
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| format!("invalid endpoint {endpoint}: {e}"))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<RawResponse, String> {
        let url = self.url_for(request.endpoint)?;
        debug!("Sending request to {}", url);

        let builder = match request.payload {
            Payload::Query(pairs) => self.client.get(url).query(&pairs),
            Payload::Json(body) => self.client.post(url).json(&body),
        };

        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;

        Ok(RawResponse { status, body })
    }
}
