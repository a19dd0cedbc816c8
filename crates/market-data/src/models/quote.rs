use serde::{Deserialize, Serialize};

use super::types::Currency;

/// Latest price for a ticker as reported by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Last traded / current price
    pub price: f64,

    /// Quote currency, when the provider knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,

    /// Source of the quote (FINNHUB, STOOQ, PROXY)
    pub source: String,
}

impl PriceQuote {
    /// Create a quote with an unknown currency
    pub fn new(price: f64, source: &str) -> Self {
        Self {
            price,
            currency: None,
            source: source.to_string(),
        }
    }

    /// Attach the quote currency
    pub fn with_currency(mut self, currency: impl Into<Currency>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}
