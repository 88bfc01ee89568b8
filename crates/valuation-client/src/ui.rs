//! UI abstraction between the orchestration core and a front-end
//!
//! The core emits [`RenderInstruction`]s and receives user actions through
//! [`UiHandlers`]; it never assumes a specific rendering technology.

use crate::format::{format_number, format_ratio};
use crate::models::{AnalysisResult, StockSummary};
use crate::params::ParamField;
use crate::progress::ProgressState;
use async_trait::async_trait;
use std::time::Duration;

/// Which progress indicator / submit control an instruction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Search,
    Analysis,
}

/// Display-ready valuation figures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationFields {
    pub enterprise_value: String,
    pub equity_value: String,
    pub per_share_value: String,
    pub pe_ratio: String,
    pub pb_ratio: String,
    pub ev_fcf_ratio: String,
}

impl From<&AnalysisResult> for ValuationFields {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            enterprise_value: format_number(result.enterprise_value),
            equity_value: format_number(result.equity_value),
            per_share_value: format_number(result.per_share_value),
            pe_ratio: format_ratio(result.validation.pe_ratio),
            pb_ratio: format_ratio(result.validation.pb_ratio),
            ev_fcf_ratio: format_ratio(result.validation.ev_fcf_ratio),
        }
    }
}

/// Instruction for the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Replace the result list with a fresh first page
    ReplaceResults { items: Vec<StockSummary>, total: u64 },
    /// Append a further page to the result list
    AppendResults { items: Vec<StockSummary>, total: u64 },
    /// Successful search with no matches
    ShowEmpty,
    /// First-page search failed
    ShowSearchError,
    /// Show or remove the "load more" affordance
    SetLoadMore(bool),
    SetValuation(ValuationFields),
    /// Primary valuation slots enter the failed state
    MarkValuationError,
    /// Reset every valuation slot to the neutral placeholder
    ClearValuation,
    /// Banner the renderer dismisses after `duration`
    ShowTransientError { message: String, duration: Duration },
    /// Advisory, non-blocking parameter warning
    ShowWarning(String),
    /// A control value could not be used
    ShowInputError { field: ParamField, message: String },
    /// Echo of a control value in display units
    ShowParamValue { field: ParamField, display: String },
    Progress { indicator: Indicator, state: ProgressState },
    SetSubmitEnabled { indicator: Indicator, enabled: bool },
}

/// Consumes render instructions
pub trait Renderer: Send + Sync {
    fn render(&self, instruction: RenderInstruction);
}

/// User actions a front-end forwards to the core
#[async_trait]
pub trait UiHandlers: Send + Sync {
    /// Search submitted (button or enter key)
    async fn on_submit(&self, keyword: &str);

    /// A valuation control changed
    async fn on_input_change(&self, field: ParamField, value: &str);

    /// "Load more" pressed
    async fn on_load_more(&self);

    /// Analysis requested for a stock in the result list
    async fn on_analyze(&self, stock_code: &str);
}
