//! Single-shot valuation workflow

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{Outcome, RequestGateway, Slot};
use crate::models::AnalysisResult;
use crate::params::RawParams;
use crate::progress::ProgressReporter;
use crate::ui::{Indicator, RenderInstruction, Renderer, ValuationFields};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Runs one valuation request per invocation
///
/// Previous figures are cleared before every run, and the progress
/// indicator is hidden after the grace delay on every exit path.
pub struct AnalysisWorkflow {
    gateway: RequestGateway,
    renderer: Arc<dyn Renderer>,
    progress: ProgressReporter,
    slot: Slot,
    banner_duration: Duration,
}

impl AnalysisWorkflow {
    pub fn new(gateway: RequestGateway, renderer: Arc<dyn Renderer>, config: &ClientConfig) -> Self {
        let progress = ProgressReporter::new(
            Indicator::Analysis,
            renderer.clone(),
            config.progress_hide_delay,
        );

        Self {
            gateway,
            renderer,
            progress,
            slot: Slot::new("analysis"),
            banner_duration: config.error_banner_duration,
        }
    }

    pub fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Value `stock_code` with the given control values
    ///
    /// Returns `Err` for unusable input (no request is sent), `Ok(None)` when
    /// the request failed or was superseded by a newer run.
    pub async fn run(&self, stock_code: &str, raw: &RawParams) -> Result<Option<AnalysisResult>> {
        let ticket = self.slot.begin();

        self.renderer.render(RenderInstruction::ClearValuation);
        self.set_submit_enabled(false);
        self.progress.show();
        self.progress.tick(30, "正在获取数据...");

        let params = match raw.to_params(stock_code) {
            Ok(params) => params,
            Err(e) => {
                debug!("Analysis input rejected: {}", e);
                self.render_input_error(&e);
                self.finish();
                return Err(e);
            }
        };

        self.progress.tick(60, "正在分析...");
        debug!("Analysis #{} for {}", ticket.sequence(), params.stock_code);
        let outcome = self.gateway.analyze(&params, ticket.token()).await;

        if !self.slot.is_current(&ticket) {
            debug!("Discarding stale analysis #{}", ticket.sequence());
            return Ok(None);
        }

        let result = match outcome {
            Outcome::Success(result) => {
                self.progress.tick(90, "更新结果...");
                self.renderer
                    .render(RenderInstruction::SetValuation(ValuationFields::from(&result)));
                self.progress.tick(100, "分析完成");
                info!("Analysis of {} complete", params.stock_code);
                Some(result)
            }
            failed => {
                let message = failed
                    .failure_message()
                    .unwrap_or("分析请求失败，请稍后重试")
                    .to_string();
                error!("Analysis of {} failed: {}", params.stock_code, message);
                self.renderer.render(RenderInstruction::ShowTransientError {
                    message,
                    duration: self.banner_duration,
                });
                self.renderer.render(RenderInstruction::MarkValuationError);
                None
            }
        };

        self.finish();
        Ok(result)
    }

    fn render_input_error(&self, err: &ClientError) {
        let instruction = match err {
            ClientError::InvalidNumber { field, .. } => RenderInstruction::ShowInputError {
                field: *field,
                message: err.to_string(),
            },
            other => RenderInstruction::ShowTransientError {
                message: other.to_string(),
                duration: self.banner_duration,
            },
        };
        self.renderer.render(instruction);
    }

    fn finish(&self) {
        self.set_submit_enabled(true);
        self.progress.hide_after_delay();
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.renderer.render(RenderInstruction::SetSubmitEnabled {
            indicator: Indicator::Analysis,
            enabled,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Payload, RawResponse};
    use crate::params::ParamField;
    use crate::test_support::{RecordingRenderer, ScriptedTransport};
    use serde_json::json;

    fn raw(discount: &str, growth: &str, period: &str) -> RawParams {
        RawParams {
            discount_rate: discount.to_string(),
            growth_rate: growth.to_string(),
            forecast_period: period.to_string(),
        }
    }

    fn workflow_with(
        transport: &Arc<ScriptedTransport>,
    ) -> (AnalysisWorkflow, Arc<RecordingRenderer>) {
        let config = ClientConfig::default();
        let renderer = RecordingRenderer::new();
        let gateway = RequestGateway::new(transport.clone(), &config);
        (AnalysisWorkflow::new(gateway, renderer.clone(), &config), renderer)
    }

    fn valuation_body(validation: serde_json::Value) -> RawResponse {
        RawResponse::ok(
            json!({
                "success": true,
                "data": {
                    "enterprise_value": 2.5e12,
                    "equity_value": 2.4e12,
                    "per_share_value": 191.2,
                    "validation": validation
                }
            })
            .to_string(),
        )
    }

    fn valuation_set(renderer: &RecordingRenderer) -> Option<ValuationFields> {
        renderer.instructions().into_iter().find_map(|i| match i {
            RenderInstruction::SetValuation(fields) => Some(fields),
            _ => None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_analysis() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (
                Duration::from_millis(200),
                Ok(valuation_body(json!({"peRatio": 28.3, "pbRatio": 9.1, "evFcfRatio": 22.0}))),
            )
        }));
        let (workflow, renderer) = workflow_with(&transport);

        let result = workflow.run("600519", &raw("9", "3", "5")).await.unwrap();
        assert_eq!(result.map(|r| r.per_share_value), Some(191.2));

        match &transport.requests()[0].payload {
            Payload::Json(body) => {
                assert_eq!(body["stockCode"], "600519");
                assert!((body["discountRate"].as_f64().unwrap() - 0.09).abs() < 1e-12);
                assert!((body["growthRate"].as_f64().unwrap() - 0.03).abs() < 1e-12);
                assert_eq!(body["forecastPeriod"], 5);
            }
            Payload::Query(_) => panic!("Expected JSON payload"),
        }

        assert_eq!(renderer.instructions()[0], RenderInstruction::ClearValuation);
        let fields = valuation_set(&renderer).unwrap();
        assert_eq!(fields.enterprise_value, "25000.00亿");
        assert_eq!(fields.per_share_value, "191.20");
        assert_eq!(fields.pb_ratio, "9.10x");

        assert_eq!(
            renderer.progress_percents(Indicator::Analysis),
            vec![0, 30, 60, 90, 100]
        );
        assert_eq!(workflow.progress().state().message, "分析完成");

        tokio::time::sleep(Duration::from_millis(1501)).await;
        assert!(!workflow.progress().state().visible);
    }

    #[tokio::test]
    async fn test_missing_ratios_render_as_dash() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (Duration::ZERO, Ok(valuation_body(json!({"peRatio": 28.3}))))
        }));
        let (workflow, renderer) = workflow_with(&transport);

        workflow.run("600519", &raw("9", "3", "5")).await.unwrap();

        let fields = valuation_set(&renderer).unwrap();
        assert_eq!(fields.pe_ratio, "28.30x");
        assert_eq!(fields.pb_ratio, "-");
        assert_eq!(fields.ev_fcf_ratio, "-");
        assert_eq!(fields.equity_value, "24000.00亿");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_marks_valuation_failed() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (Duration::from_secs(45), Ok(valuation_body(json!({}))))
        }));
        let (workflow, renderer) = workflow_with(&transport);

        let started = tokio::time::Instant::now();
        let result = workflow.run("600519", &raw("9", "3", "5")).await.unwrap();
        assert!(result.is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        let instructions = renderer.instructions();
        assert!(instructions.contains(&RenderInstruction::MarkValuationError));
        assert!(instructions.contains(&RenderInstruction::ShowTransientError {
            message: "请求超时，请重试".to_string(),
            duration: Duration::from_millis(3000),
        }));
        assert!(valuation_set(&renderer).is_none());

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(workflow.progress().state().visible);
        tokio::time::sleep(Duration::from_millis(101)).await;
        assert!(!workflow.progress().state().visible);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(valuation_set(&renderer).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_business_failure_surfaces_server_message() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (
                Duration::ZERO,
                Ok(RawResponse::ok(
                    json!({"success": false, "message": "获取财务数据失败", "data": null})
                        .to_string(),
                )),
            )
        }));
        let (workflow, renderer) = workflow_with(&transport);

        workflow.run("000000", &raw("9", "3", "5")).await.unwrap();

        let instructions = renderer.instructions();
        assert!(instructions.contains(&RenderInstruction::MarkValuationError));
        assert!(instructions.iter().any(|i| matches!(
            i,
            RenderInstruction::ShowTransientError { message, .. } if message == "获取财务数据失败"
        )));
        assert!(valuation_set(&renderer).is_none());

        assert!(workflow.progress().state().visible);
        tokio::time::sleep(Duration::from_millis(1501)).await;
        assert!(!workflow.progress().state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_status_shows_body_message() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (
                Duration::ZERO,
                Ok(RawResponse {
                    status: 500,
                    body: json!({"success": false, "message": "获取财务数据失败"}).to_string(),
                }),
            )
        }));
        let (workflow, renderer) = workflow_with(&transport);

        let result = workflow.run("000000", &raw("9", "3", "5")).await.unwrap();
        assert!(result.is_none());

        let instructions = renderer.instructions();
        assert!(instructions.contains(&RenderInstruction::MarkValuationError));
        assert!(instructions.contains(&RenderInstruction::ShowTransientError {
            message: "获取财务数据失败".to_string(),
            duration: Duration::from_millis(3000),
        }));

        tokio::time::sleep(Duration::from_millis(1501)).await;
        assert!(!workflow.progress().state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_input_aborts_before_request() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            (Duration::ZERO, Ok(valuation_body(json!({}))))
        }));
        let (workflow, renderer) = workflow_with(&transport);

        let err = workflow.run("600519", &raw("9", "3", "five")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(transport.requests().is_empty());

        assert!(renderer.instructions().iter().any(|i| matches!(
            i,
            RenderInstruction::ShowInputError { field: ParamField::ForecastPeriod, .. }
        )));
        assert!(!renderer.instructions().contains(&RenderInstruction::MarkValuationError));

        tokio::time::sleep(Duration::from_millis(1501)).await;
        assert!(!workflow.progress().state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_run_supersedes_older() {
        let transport = Arc::new(ScriptedTransport::new(|request| match &request.payload {
            Payload::Json(body) if body["stockCode"] == "600519" => {
                (Duration::from_secs(3), Ok(valuation_body(json!({}))))
            }
            _ => (
                Duration::from_secs(1),
                Ok(RawResponse::ok(
                    json!({
                        "success": true,
                        "data": {"enterprise_value": 5.0e9, "equity_value": 4.0e9, "per_share_value": 12.5}
                    })
                    .to_string(),
                )),
            ),
        }));
        let (workflow, renderer) = workflow_with(&transport);
        let params = raw("9", "3", "5");

        let (first, second) = tokio::join!(workflow.run("600519", &params), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            workflow.run("000001", &params).await
        });

        assert!(first.unwrap().is_none());
        assert_eq!(second.unwrap().map(|r| r.per_share_value), Some(12.5));

        let values: Vec<_> = renderer
            .instructions()
            .into_iter()
            .filter_map(|i| match i {
                RenderInstruction::SetValuation(fields) => Some(fields.per_share_value),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec!["12.50"]);
    }
}
