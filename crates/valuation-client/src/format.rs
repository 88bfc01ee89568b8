//! Display formatting for amounts and multiples

use crate::models::StockSummary;

const YI: f64 = 100_000_000.0;
const WAN: f64 = 10_000.0;

/// Placeholder shown for absent or unrenderable values
pub const DASH: &str = "-";

/// Format an amount with 亿/万 magnitude units and two decimals
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return DASH.to_string();
    }

    if value.abs() >= YI {
        format!("{:.2}亿", value / YI)
    } else if value.abs() >= WAN {
        format!("{:.2}万", value / WAN)
    } else {
        format!("{value:.2}")
    }
}

/// Format an optional amount, dashing missing values
pub fn format_optional_number(value: Option<f64>) -> String {
    value.map_or_else(|| DASH.to_string(), format_number)
}

/// Format a valuation multiple such as `28.30x`
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}x"),
        _ => DASH.to_string(),
    }
}

/// One-line metrics summary for a search hit
pub fn stock_metrics(stock: &StockSummary) -> String {
    format!(
        "市值: {}  PE: {}  PB: {}",
        format_optional_number(stock.market_cap),
        stock.pe.map_or_else(|| DASH.to_string(), |v| format!("{v:.2}")),
        stock.pb.map_or_else(|| DASH.to_string(), |v| format!("{v:.2}")),
    )
}
