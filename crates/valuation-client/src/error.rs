//! Error types for the valuation client

use crate::params::ParamField;
use thiserror::Error;

/// Errors raised by the client core before or outside of a network call
///
/// Network outcomes never surface here; the gateway resolves them into
/// [`crate::Outcome`] instead.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Search submitted with an empty or whitespace keyword
    #[error("请输入搜索关键词")]
    EmptyKeyword,

    /// A numeric control value could not be parsed
    #[error("{field}输入无效: {value:?}")]
    InvalidNumber { field: ParamField, value: String },

    /// Stock code missing for an analysis request
    #[error("请选择要分析的股票")]
    MissingStockCode,

    /// Progress update issued while the indicator is hidden
    #[error("Progress update while indicator hidden")]
    ProgressInactive,

    /// Progress update would move the indicator backwards
    #[error("Progress regression from {from}% to {to}%")]
    ProgressRegression { from: u8, to: u8 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Environment lookup failed
    #[error("Environment error: {0}")]
    Env(#[from] valuation_utils::EnvError),
}

impl ClientError {
    /// Whether this error stems from user input rather than a system fault
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyKeyword | Self::InvalidNumber { .. } | Self::MissingStockCode
        )
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
