//! Valuation controls panel
//!
//! Holds the raw control values as typed (rates in percent), echoes changes
//! back to the renderer with advisory warnings, and assembles
//! [`AnalysisParams`] with pre-flight validation.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::AnalysisParams;
use crate::ui::{RenderInstruction, Renderer};
use crate::validator::ParamValidator;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A valuation control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    /// Discount rate, percent
    DiscountRate,
    /// Perpetual growth rate, percent
    GrowthRate,
    /// Forecast period, whole years
    ForecastPeriod,
}

impl ParamField {
    pub const ALL: [Self; 3] = [Self::DiscountRate, Self::GrowthRate, Self::ForecastPeriod];

    /// Display form of a raw control value
    pub fn display_value(self, raw: &str) -> String {
        match self {
            Self::DiscountRate | Self::GrowthRate => format!("{}%", raw.trim()),
            Self::ForecastPeriod => format!("{}年", raw.trim()),
        }
    }
}

impl std::fmt::Display for ParamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::DiscountRate => "折现率",
            Self::GrowthRate => "永续增长率",
            Self::ForecastPeriod => "预测期",
        })
    }
}

impl FromStr for ParamField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discount" | "discountrate" | "discount_rate" | "dr" => Ok(Self::DiscountRate),
            "growth" | "growthrate" | "growth_rate" | "gr" => Ok(Self::GrowthRate),
            "period" | "forecast" | "forecastperiod" | "forecast_period" | "years" => {
                Ok(Self::ForecastPeriod)
            }
            other => Err(format!("unknown parameter '{other}'")),
        }
    }
}

/// Raw control values exactly as entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParams {
    pub discount_rate: String,
    pub growth_rate: String,
    pub forecast_period: String,
}

impl RawParams {
    pub fn get(&self, field: ParamField) -> &str {
        match field {
            ParamField::DiscountRate => &self.discount_rate,
            ParamField::GrowthRate => &self.growth_rate,
            ParamField::ForecastPeriod => &self.forecast_period,
        }
    }

    fn set(&mut self, field: ParamField, value: String) {
        match field {
            ParamField::DiscountRate => self.discount_rate = value,
            ParamField::GrowthRate => self.growth_rate = value,
            ParamField::ForecastPeriod => self.forecast_period = value,
        }
    }

    /// Convert to request parameters, rejecting malformed numbers
    pub fn to_params(&self, stock_code: &str) -> Result<AnalysisParams> {
        let stock_code = stock_code.trim();
        if stock_code.is_empty() {
            return Err(ClientError::MissingStockCode);
        }

        let discount = parse_rate(ParamField::DiscountRate, &self.discount_rate)?;
        let growth = parse_rate(ParamField::GrowthRate, &self.growth_rate)?;
        let years = self
            .forecast_period
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|years| *years > 0)
            .ok_or_else(|| invalid(ParamField::ForecastPeriod, &self.forecast_period))?;

        Ok(AnalysisParams::from_percent(stock_code, discount, growth, years))
    }
}

fn parse_rate(field: ParamField, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(field, raw))
}

fn invalid(field: ParamField, raw: &str) -> ClientError {
    ClientError::InvalidNumber {
        field,
        value: raw.to_string(),
    }
}

/// Current valuation control values
pub struct ParamsPanel {
    renderer: Arc<dyn Renderer>,
    values: Mutex<RawParams>,
}

impl ParamsPanel {
    pub fn new(config: &ClientConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            values: Mutex::new(RawParams {
                discount_rate: config.default_discount_rate.to_string(),
                growth_rate: config.default_growth_rate.to_string(),
                forecast_period: config.default_forecast_period.to_string(),
            }),
        }
    }

    fn values(&self) -> MutexGuard<'_, RawParams> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> RawParams {
        self.values().clone()
    }

    /// Echo every control's initial value
    pub fn initialize(&self) {
        let values = self.snapshot();
        for field in ParamField::ALL {
            self.renderer.render(RenderInstruction::ShowParamValue {
                field,
                display: field.display_value(values.get(field)),
            });
        }
    }

    /// Record a control change and surface advisory warnings
    pub fn set(&self, field: ParamField, value: &str) {
        self.values().set(field, value.to_string());
        self.renderer.render(RenderInstruction::ShowParamValue {
            field,
            display: field.display_value(value),
        });

        let Ok(number) = value.trim().parse::<f64>() else {
            return;
        };
        let check = match field {
            ParamField::DiscountRate => ParamValidator::validate_discount_rate(number),
            ParamField::GrowthRate => ParamValidator::validate_growth_rate(number),
            ParamField::ForecastPeriod => return,
        };
        if let Some(message) = check.message {
            self.renderer.render(RenderInstruction::ShowWarning(message));
        }
    }
}
