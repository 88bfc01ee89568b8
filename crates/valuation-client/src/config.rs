//! Configuration for the valuation client

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use valuation_utils::{env_or, env_parse};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Configuration for the search and analysis workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend serving `/api/search` and `/api/analyze`
    pub base_url: String,

    /// Hard deadline for a search call
    pub search_timeout: Duration,

    /// Hard deadline for an analysis call
    pub analysis_timeout: Duration,

    /// Results requested per search page
    pub page_size: u32,

    /// How long the final progress message stays visible before hiding
    pub progress_hide_delay: Duration,

    /// Lifetime of a transient error banner
    pub error_banner_duration: Duration,

    /// Initial discount rate control value, in percent
    pub default_discount_rate: f64,

    /// Initial perpetual growth rate control value, in percent
    pub default_growth_rate: f64,

    /// Initial forecast period control value, in years
    pub default_forecast_period: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_timeout: Duration::from_secs(10),
            analysis_timeout: Duration::from_secs(10),
            page_size: 10,
            progress_hide_delay: Duration::from_millis(1500),
            error_banner_duration: Duration::from_millis(3000),
            default_discount_rate: 10.0,
            default_growth_rate: 3.0,
            default_forecast_period: 5,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from `VALUATION_*` environment variables
    ///
    /// `VALUATION_TIMEOUT_SECS` applies to both search and analysis calls.
    pub fn from_env() -> Result<Self> {
        let mut builder =
            Self::builder().base_url(env_or("VALUATION_API_BASE", DEFAULT_BASE_URL));

        if let Some(secs) = env_parse::<u64>("VALUATION_TIMEOUT_SECS")? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(page_size) = env_parse::<u32>("VALUATION_PAGE_SIZE")? {
            builder = builder.page_size(page_size);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::ConfigError(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::ConfigError(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.search_timeout.is_zero() || self.analysis_timeout.is_zero() {
            return Err(ClientError::ConfigError(
                "request timeouts must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(ClientError::ConfigError(
                "page_size must be greater than 0".to_string(),
            ));
        }

        if self.default_forecast_period == 0 {
            return Err(ClientError::ConfigError(
                "default_forecast_period must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    search_timeout: Option<Duration>,
    analysis_timeout: Option<Duration>,
    page_size: Option<u32>,
    progress_hide_delay: Option<Duration>,
    error_banner_duration: Option<Duration>,
    default_discount_rate: Option<f64>,
    default_growth_rate: Option<f64>,
    default_forecast_period: Option<u32>,
}

impl ClientConfigBuilder {
    /// Set the backend base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the search timeout
    pub fn search_timeout(mut self, duration: Duration) -> Self {
        self.search_timeout = Some(duration);
        self
    }

    /// Set the analysis timeout
    pub fn analysis_timeout(mut self, duration: Duration) -> Self {
        self.analysis_timeout = Some(duration);
        self
    }

    /// Set the same timeout for search and analysis
    pub fn request_timeout(self, duration: Duration) -> Self {
        self.search_timeout(duration).analysis_timeout(duration)
    }

    /// Set the search page size
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the progress hide grace delay
    pub fn progress_hide_delay(mut self, duration: Duration) -> Self {
        self.progress_hide_delay = Some(duration);
        self
    }

    /// Set the transient error banner lifetime
    pub fn error_banner_duration(mut self, duration: Duration) -> Self {
        self.error_banner_duration = Some(duration);
        self
    }

    /// Set the initial discount rate, in percent
    pub fn default_discount_rate(mut self, percent: f64) -> Self {
        self.default_discount_rate = Some(percent);
        self
    }

    /// Set the initial growth rate, in percent
    pub fn default_growth_rate(mut self, percent: f64) -> Self {
        self.default_growth_rate = Some(percent);
        self
    }

    /// Set the initial forecast period, in years
    pub fn default_forecast_period(mut self, years: u32) -> Self {
        self.default_forecast_period = Some(years);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let config = ClientConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            search_timeout: self.search_timeout.unwrap_or(defaults.search_timeout),
            analysis_timeout: self.analysis_timeout.unwrap_or(defaults.analysis_timeout),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            progress_hide_delay: self
                .progress_hide_delay
                .unwrap_or(defaults.progress_hide_delay),
            error_banner_duration: self
                .error_banner_duration
                .unwrap_or(defaults.error_banner_duration),
            default_discount_rate: self
                .default_discount_rate
                .unwrap_or(defaults.default_discount_rate),
            default_growth_rate: self
                .default_growth_rate
                .unwrap_or(defaults.default_growth_rate),
            default_forecast_period: self
                .default_forecast_period
                .unwrap_or(defaults.default_forecast_period),
        };

        config.validate()?;
        Ok(config)
    }
}
