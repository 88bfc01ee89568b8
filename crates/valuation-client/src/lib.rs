//! Stock search and valuation client core
//!
//! This crate turns user actions into outbound queries against the search and
//! analysis services and maps every outcome back onto UI state. It includes:
//!
//! - A request gateway with per-call timeouts, cooperative cancellation and a
//!   sequence-number guard against stale responses
//! - A progress reporter driving a multi-stage progress indicator
//! - Advisory validation of valuation parameters
//! - A paginated search session ("search, then load more")
//! - A single-shot valuation workflow
//!
//! # Architecture
//!
//! The core never touches a display directly. Workflows emit
//! [`RenderInstruction`]s through a [`Renderer`], and front-ends feed user
//! actions in through the [`UiHandlers`] capability set implemented by
//! [`ValuationApp`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use valuation_client::{ClientConfig, UiHandlers, ValuationApp};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let app = ValuationApp::new(config, Arc::new(MyRenderer))?;
//!
//!     app.on_submit("贵州").await;
//!     app.on_analyze("600519").await;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod models;
pub mod params;
pub mod progress;
pub mod search;
pub mod ui;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use analysis::AnalysisWorkflow;
pub use app::ValuationApp;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use gateway::{Outcome, RequestGateway, TransportFailure, TransportKind};
pub use models::{AnalysisParams, AnalysisResult, Market, SearchQuery, SearchResultPage, StockSummary};
pub use params::{ParamField, ParamsPanel};
pub use progress::{ProgressReporter, ProgressState};
pub use search::{SearchSession, SearchSessionState};
pub use ui::{Indicator, RenderInstruction, Renderer, UiHandlers, ValuationFields};
pub use validator::{ParamCheck, ParamValidator};
