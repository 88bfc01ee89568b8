//! Request gateway for the search and analysis services
//!
//! Every call is time-bounded and cancellable and resolves to an
//! [`Outcome`]; nothing is thrown past this boundary. The gateway never
//! touches UI state, callers own all state transitions.

pub mod slot;
pub mod transport;

pub use slot::{Slot, Ticket};
pub use transport::{Endpoint, HttpRequest, Payload, RawResponse, ReqwestTransport, Transport};

use crate::config::ClientConfig;
use crate::models::{AnalysisParams, AnalysisResult, AnalyzeResponse, SearchQuery, SearchResponse, SearchResultPage};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a call failed below the business layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Client-enforced deadline exceeded
    Timeout,
    /// Non-2xx HTTP status
    HttpError(u16),
    /// Body was not the expected JSON
    Malformed,
    /// Connection-level failure reported by the transport
    Network,
    /// Superseded by a newer call in the same slot
    Cancelled,
}

/// Transport-level failure with a user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportKind,
    pub message: String,
}

impl TransportFailure {
    pub fn timeout() -> Self {
        Self {
            kind: TransportKind::Timeout,
            message: "请求超时，请重试".to_string(),
        }
    }

    pub fn http(status: u16) -> Self {
        Self {
            kind: TransportKind::HttpError(status),
            message: format!("HTTP error: status {status}"),
        }
    }

    /// HTTP failure carrying the server's own explanation
    pub fn http_with_message(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportKind::HttpError(status),
            message: message.into(),
        }
    }

    pub fn malformed() -> Self {
        Self {
            kind: TransportKind::Malformed,
            message: "响应数据格式错误，请稍后重试".to_string(),
        }
    }

    pub fn network(reason: &str) -> Self {
        Self {
            kind: TransportKind::Network,
            message: format!("网络请求失败: {reason}"),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: TransportKind::Cancelled,
            message: "请求已取消".to_string(),
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Uniform result of every gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Well-formed response whose `success` flag is false
    BusinessFailure(String),
    TransportFailure(TransportFailure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// User-facing failure message, `None` on success
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::BusinessFailure(message) => Some(message),
            Self::TransportFailure(failure) => Some(&failure.message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        self.and_then(|value| Outcome::Success(f(value)))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Success(value) => f(value),
            Self::BusinessFailure(message) => Outcome::BusinessFailure(message),
            Self::TransportFailure(failure) => Outcome::TransportFailure(failure),
        }
    }
}

/// Issues search and analysis calls through a [`Transport`]
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    search_timeout: Duration,
    analysis_timeout: Duration,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("search_timeout", &self.search_timeout)
            .field("analysis_timeout", &self.analysis_timeout)
            .finish_non_exhaustive()
    }
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn Transport>, config: &ClientConfig) -> Self {
        Self {
            transport,
            search_timeout: config.search_timeout,
            analysis_timeout: config.analysis_timeout,
        }
    }

    /// Issue one call and classify its result
    ///
    /// On timeout the token is cancelled and the pending transport future is
    /// dropped, so a late response can no longer arrive through this call.
    pub async fn call(
        &self,
        endpoint: Endpoint,
        payload: Payload,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Outcome<Value> {
        debug!("Calling {} (timeout {:?})", endpoint, timeout);
        let request = HttpRequest { endpoint, payload };

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Call to {} cancelled", endpoint);
                return Outcome::TransportFailure(TransportFailure::cancelled());
            }
            result = tokio::time::timeout(timeout, self.transport.send(request)) => match result {
                Err(_) => {
                    cancel.cancel();
                    warn!("Call to {} timed out after {:?}", endpoint, timeout);
                    return Outcome::TransportFailure(TransportFailure::timeout());
                }
                Ok(Err(reason)) => {
                    warn!("Call to {} failed: {}", endpoint, reason);
                    return Outcome::TransportFailure(TransportFailure::network(&reason));
                }
                Ok(Ok(response)) => response,
            },
        };

        classify(endpoint, &response)
    }

    /// `GET /api/search`
    pub async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Outcome<SearchResultPage> {
        self.call(
            Endpoint::Search,
            Payload::Query(query.to_query_pairs()),
            self.search_timeout,
            cancel,
        )
        .await
        .and_then(decode::<SearchResponse>)
        .map(SearchResultPage::from)
    }

    /// `POST /api/analyze`
    pub async fn analyze(
        &self,
        params: &AnalysisParams,
        cancel: &CancellationToken,
    ) -> Outcome<AnalysisResult> {
        let body = match serde_json::to_value(params) {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to encode analysis params: {}", e);
                return Outcome::TransportFailure(TransportFailure::malformed());
            }
        };

        self.call(Endpoint::Analyze, Payload::Json(body), self.analysis_timeout, cancel)
            .await
            .and_then(decode::<AnalyzeResponse>)
            .and_then(|response| match response.data {
                Some(result) => Outcome::Success(result),
                None => Outcome::BusinessFailure(
                    response
                        .message
                        .unwrap_or_else(|| Endpoint::Analyze.failure_message().to_string()),
                ),
            })
    }
}

fn classify(endpoint: Endpoint, response: &RawResponse) -> Outcome<Value> {
    if !response.is_success() {
        warn!("Call to {} returned HTTP {}", endpoint, response.status);
        let failure = match envelope_failure_message(&response.body) {
            Some(message) => TransportFailure::http_with_message(response.status, message),
            None => TransportFailure::http(response.status),
        };
        return Outcome::TransportFailure(failure);
    }

    let body: Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(e) => {
            warn!("Unparseable body from {}: {}", endpoint, e);
            return Outcome::TransportFailure(TransportFailure::malformed());
        }
    };

    match body.get("success").and_then(Value::as_bool) {
        Some(true) => Outcome::Success(body),
        Some(false) => {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(endpoint.failure_message())
                .to_string();
            Outcome::BusinessFailure(message)
        }
        None => {
            warn!("Response from {} has no success flag", endpoint);
            Outcome::TransportFailure(TransportFailure::malformed())
        }
    }
}

/// Message of a `{"success": false, "message": ...}` error body
fn envelope_failure_message(body: &str) -> Option<String> {
    let body: Value = serde_json::from_str(body).ok()?;
    if body.get("success").and_then(Value::as_bool) != Some(false) {
        return None;
    }
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(body: Value) -> Outcome<T> {
    serde_json::from_value(body).map_or_else(
        |e| {
            warn!("Response did not match expected shape: {}", e);
            Outcome::TransportFailure(TransportFailure::malformed())
        },
        Outcome::Success,
    )
}
