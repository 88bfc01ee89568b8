//! Test doubles shared by the unit tests

use crate::gateway::{HttpRequest, Payload, RawResponse, Transport};
use crate::ui::{Indicator, RenderInstruction, Renderer};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Renderer that records every instruction
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    instructions: Mutex<Vec<RenderInstruction>>,
}

impl RecordingRenderer {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn instructions(&self) -> Vec<RenderInstruction> {
        self.instructions.lock().unwrap().clone()
    }

    pub(crate) fn clear(&self) {
        self.instructions.lock().unwrap().clear();
    }

    /// Percent values emitted for `indicator` while visible
    pub(crate) fn progress_percents(&self, indicator: Indicator) -> Vec<u8> {
        self.instructions()
            .into_iter()
            .filter_map(|instruction| match instruction {
                RenderInstruction::Progress { indicator: i, state } if i == indicator && state.visible => {
                    Some(state.percent)
                }
                _ => None,
            })
            .collect()
    }

    /// Codes currently shown in the result list, replaying replace/append
    pub(crate) fn rendered_codes(&self) -> Vec<String> {
        let mut codes = Vec::new();
        for instruction in self.instructions() {
            match instruction {
                RenderInstruction::ReplaceResults { items, .. } => {
                    codes = items.into_iter().map(|s| s.code).collect();
                }
                RenderInstruction::AppendResults { items, .. } => {
                    codes.extend(items.into_iter().map(|s| s.code));
                }
                RenderInstruction::ShowEmpty | RenderInstruction::ShowSearchError => codes.clear(),
                _ => {}
            }
        }
        codes
    }

    /// Last value of the load-more affordance
    pub(crate) fn load_more_visible(&self) -> bool {
        self.instructions()
            .into_iter()
            .filter_map(|instruction| match instruction {
                RenderInstruction::SetLoadMore(visible) => Some(visible),
                _ => None,
            })
            .next_back()
            .unwrap_or(false)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, instruction: RenderInstruction) {
        self.instructions.lock().unwrap().push(instruction);
    }
}

type Responder =
    dyn Fn(&HttpRequest) -> (Duration, Result<RawResponse, String>) + Send + Sync;

/// Transport answering from a closure after a per-request delay
pub(crate) struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        responder: impl Fn(&HttpRequest) -> (Duration, Result<RawResponse, String>)
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, String> {
        self.requests.lock().unwrap().push(request.clone());
        let (delay, response) = (self.responder)(&request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

/// Value of a query-string parameter in a GET request
pub(crate) fn query_param(request: &HttpRequest, key: &str) -> Option<String> {
    match &request.payload {
        Payload::Query(pairs) => pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()),
        Payload::Json(_) => None,
    }
}

/// Search body with `count` stocks whose codes start at `first_code`
pub(crate) fn search_body(first_code: u32, count: u32, total: u64) -> RawResponse {
    let data: Vec<_> = (first_code..first_code + count)
        .map(|code| json!({"code": format!("{code:06}"), "name": format!("股票{code}"), "market": "上证"}))
        .collect();
    RawResponse::ok(json!({"success": true, "data": data, "total": total}).to_string())
}
