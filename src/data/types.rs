use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily close in a price history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Chronologically ordered closes; the last element is the latest.
pub type PriceHistory = Vec<PricePoint>;

/// Source and target currency for the converted quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            base: base.into().trim().to_uppercase(),
            target: target.into().trim().to_uppercase(),
        }
    }

    pub fn base_symbol(&self) -> String {
        currency_symbol(&self.base)
    }

    pub fn target_symbol(&self) -> String {
        currency_symbol(&self.target)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new(
            crate::constants::fx::DEFAULT_BASE,
            crate::constants::fx::DEFAULT_TARGET,
        )
    }
}

/// Display prefix for a currency code; unknown codes render as "CODE ".
pub fn currency_symbol(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "INR" => "₹".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{} ", other),
    }
}
