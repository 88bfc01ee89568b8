//! Wire and domain types for search and valuation

use serde::{Deserialize, Serialize};

/// Exchange board a stock is listed on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Market {
    /// Shanghai main board
    Sh,
    /// Shenzhen main board
    Sz,
    /// ChiNext growth board
    ChiNext,
    /// Any unrecognised label, displayed as 其他
    #[default]
    Other,
}

impl Market {
    /// Display label as sent by the search service
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sh => "上证",
            Self::Sz => "深证",
            Self::ChiNext => "创业板",
            Self::Other => "其他",
        }
    }

    /// Style class for the market tag
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Sh => "sh",
            Self::Sz => "sz",
            Self::ChiNext => "cyb",
            Self::Other => "other",
        }
    }
}

impl From<String> for Market {
    fn from(label: String) -> Self {
        match label.trim() {
            "上证" | "SH" | "sh" => Self::Sh,
            "深证" | "SZ" | "sz" => Self::Sz,
            "创业板" | "ChiNext" | "cyb" => Self::ChiNext,
            _ => Self::Other,
        }
    }
}

impl From<Market> for String {
    fn from(market: Market) -> Self {
        market.label().to_string()
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub market: Market,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub pb: Option<f64>,
}

/// An issued search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            keyword: keyword.into(),
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Query-string pairs for `GET /api/search`
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("keyword".to_string(), self.keyword.clone()),
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.page_size.to_string()),
        ]
    }
}

/// One page of search results
///
/// `total` counts every match on the server, not just this page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultPage {
    pub items: Vec<StockSummary>,
    pub total: u64,
}

impl SearchResultPage {
    /// Build a page, raising `total` so that it never undercounts `items`
    pub fn new(items: Vec<StockSummary>, total: u64) -> Self {
        let total = total.max(items.len() as u64);
        Self { items, total }
    }
}

/// Body of `GET /api/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<StockSummary>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<SearchResponse> for SearchResultPage {
    fn from(response: SearchResponse) -> Self {
        let total = response.total.unwrap_or(response.data.len() as u64);
        Self::new(response.data, total)
    }
}

/// Parameters sent to `POST /api/analyze`
///
/// Rates are fractions (0.09 for 9%).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParams {
    pub stock_code: String,
    pub discount_rate: f64,
    pub growth_rate: f64,
    pub forecast_period: u32,
}

impl AnalysisParams {
    /// Build from percent-unit rates as entered in the controls
    pub fn from_percent(
        stock_code: impl Into<String>,
        discount_percent: f64,
        growth_percent: f64,
        forecast_period: u32,
    ) -> Self {
        Self {
            stock_code: stock_code.into(),
            discount_rate: discount_percent / 100.0,
            growth_rate: growth_percent / 100.0,
            forecast_period,
        }
    }
}

/// Cross-check multiples returned with a valuation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRatios {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub ev_fcf_ratio: Option<f64>,
}

/// Valuation computed by the analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub per_share_value: f64,
    #[serde(default)]
    pub validation: ValidationRatios,
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<AnalysisResult>,
    #[serde(default)]
    pub message: Option<String>,
}
