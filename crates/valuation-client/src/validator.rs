//! Advisory plausibility checks for valuation parameters
//!
//! These are heuristics, not correctness constraints: a failed check yields a
//! warning for display and never blocks an analysis.

/// Perpetual growth above this (percent) is implausible
pub const MAX_PLAUSIBLE_GROWTH: f64 = 5.0;

/// Discount rates below this (percent) overstate value
pub const MIN_PLAUSIBLE_DISCOUNT: f64 = 5.0;

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamCheck {
    pub valid: bool,
    pub message: Option<String>,
}

impl ParamCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn warn(message: &str) -> Self {
        Self {
            valid: false,
            message: Some(message.to_string()),
        }
    }
}

/// Stateless parameter checks, all inputs in percent units
pub struct ParamValidator;

impl ParamValidator {
    pub fn validate_growth_rate(percent: f64) -> ParamCheck {
        if percent > MAX_PLAUSIBLE_GROWTH {
            ParamCheck::warn("警告：永续增长率超过5%可能不合理")
        } else {
            ParamCheck::ok()
        }
    }

    pub fn validate_discount_rate(percent: f64) -> ParamCheck {
        if percent < MIN_PLAUSIBLE_DISCOUNT {
            ParamCheck::warn("警告：折现率过低可能高估企业价值")
        } else {
            ParamCheck::ok()
        }
    }
}
