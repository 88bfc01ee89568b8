//! Application controller wiring user actions to the workflows

use crate::analysis::AnalysisWorkflow;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::{RequestGateway, ReqwestTransport, Transport};
use crate::params::{ParamField, ParamsPanel};
use crate::search::SearchSession;
use crate::ui::{Renderer, UiHandlers};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// One page's worth of search session, analysis workflow and controls
pub struct ValuationApp {
    search: SearchSession,
    analysis: AnalysisWorkflow,
    params: ParamsPanel,
}

impl ValuationApp {
    /// Create an app talking HTTP to `config.base_url`
    pub fn new(config: ClientConfig, renderer: Arc<dyn Renderer>) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config.base_url)?);
        Ok(Self::with_transport(&config, transport, renderer))
    }

    /// Create an app over an arbitrary transport
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let gateway = RequestGateway::new(transport, config);

        Self {
            search: SearchSession::new(gateway.clone(), renderer.clone(), config),
            analysis: AnalysisWorkflow::new(gateway, renderer.clone(), config),
            params: ParamsPanel::new(config, renderer),
        }
    }

    /// Render the initial control values
    pub fn initialize(&self) {
        self.params.initialize();
    }
}

#[async_trait]
impl UiHandlers for ValuationApp {
    async fn on_submit(&self, keyword: &str) {
        if let Err(e) = self.search.submit_new_search(keyword).await {
            debug!("Search not submitted: {}", e);
        }
    }

    async fn on_input_change(&self, field: ParamField, value: &str) {
        self.params.set(field, value);
    }

    async fn on_load_more(&self) {
        self.search.load_more().await;
    }

    async fn on_analyze(&self, stock_code: &str) {
        let raw = self.params.snapshot();
        if let Err(e) = self.analysis.run(stock_code, &raw).await {
            debug!("Analysis not submitted: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Payload, RawResponse};
    use crate::test_support::{RecordingRenderer, ScriptedTransport, search_body};
    use crate::ui::RenderInstruction;
    use serde_json::json;
    use std::time::Duration;

    fn app() -> (ValuationApp, Arc<ScriptedTransport>, Arc<RecordingRenderer>) {
        let transport = Arc::new(ScriptedTransport::new(|request| match &request.payload {
            Payload::Query(_) => (Duration::ZERO, Ok(search_body(600_519, 1, 1))),
            Payload::Json(_) => (
                Duration::ZERO,
                Ok(RawResponse::ok(
                    json!({
                        "success": true,
                        "data": {"enterprise_value": 1.0e9, "equity_value": 9.0e8, "per_share_value": 45.0}
                    })
                    .to_string(),
                )),
            ),
        }));
        let renderer = RecordingRenderer::new();
        let app = ValuationApp::with_transport(
            &ClientConfig::default(),
            transport.clone(),
            renderer.clone(),
        );
        (app, transport, renderer)
    }

    #[tokio::test]
    async fn test_search_then_analyze_with_edited_params() {
        let (app, transport, renderer) = app();
        app.initialize();

        app.on_submit("茅台").await;
        assert_eq!(renderer.rendered_codes(), vec!["600519"]);

        app.on_input_change(ParamField::DiscountRate, "4").await;
        assert!(renderer.instructions().contains(&RenderInstruction::ShowWarning(
            "警告：折现率过低可能高估企业价值".to_string()
        )));

        renderer.clear();
        app.on_analyze("600519").await;

        let requests = transport.requests();
        match &requests[1].payload {
            Payload::Json(body) => {
                assert!((body["discountRate"].as_f64().unwrap() - 0.04).abs() < 1e-12);
                assert_eq!(body["forecastPeriod"], 5);
            }
            Payload::Query(_) => panic!("Expected analysis request"),
        }
        assert!(renderer.instructions().iter().any(|i| matches!(
            i,
            RenderInstruction::SetValuation(fields) if fields.per_share_value == "45.00"
        )));
    }

    #[tokio::test]
    async fn test_load_more_before_search_does_nothing() {
        let (app, transport, renderer) = app();
        app.on_load_more().await;

        assert!(transport.requests().is_empty());
        assert!(renderer.instructions().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_param_blocks_only_analysis() {
        let (app, transport, renderer) = app();
        app.on_input_change(ParamField::ForecastPeriod, "x").await;
        app.on_analyze("600519").await;

        assert!(transport.requests().is_empty());
        assert!(renderer.instructions().iter().any(|i| matches!(
            i,
            RenderInstruction::ShowInputError { field: ParamField::ForecastPeriod, .. }
        )));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: "nope".to_string(),
            ..Default::default()
        };
        assert!(ValuationApp::new(config, RecordingRenderer::new()).is_err());
    }
}
