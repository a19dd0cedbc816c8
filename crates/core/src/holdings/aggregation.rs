//! Portfolio totals over enriched holdings.
//!
//! `NaN` in any holding propagates into the totals.

use serde::Serialize;

use super::holdings_model::EnrichedHolding;

/// Sum of `current * shares`.
pub fn total_market_value(holdings: &[EnrichedHolding]) -> f64 {
    holdings.iter().map(EnrichedHolding::market_value).sum()
}

/// Sum of `average_cost * shares`.
pub fn total_invested(holdings: &[EnrichedHolding]) -> f64 {
    holdings.iter().map(EnrichedHolding::invested).sum()
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub market_value: f64,
    pub invested: f64,
    pub gain: f64,
    /// Gain relative to invested, in percent. Zero when nothing is invested.
    pub gain_percent: f64,
    /// Set when any holding is valued at cost because its price fetch failed.
    pub prices_may_be_stale: bool,
}

pub fn summarize(holdings: &[EnrichedHolding]) -> PortfolioSummary {
    let market_value = total_market_value(holdings);
    let invested = total_invested(holdings);
    let gain = market_value - invested;
    let gain_percent = if invested != 0.0 {
        gain / invested * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        market_value,
        invested,
        gain,
        gain_percent,
        prices_may_be_stale: holdings.iter().any(|h| h.price_fetch_failed),
    }
}
