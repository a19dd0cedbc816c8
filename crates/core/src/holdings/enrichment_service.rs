use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::debug;

use familyfolio_market_data::QuoteCache;

use super::holdings_model::{parse_numeric, EnrichedHolding, Holding};
use super::lot_averages::compute_lot_averages;

/// Where enrichment gets current prices from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest price for an upper-cased ticker, `None` when unavailable.
    async fn latest_price(&self, ticker: &str) -> Option<f64>;
}

#[async_trait]
impl PriceSource for QuoteCache {
    async fn latest_price(&self, ticker: &str) -> Option<f64> {
        self.get_price(ticker).await
    }
}

/// Attaches positions and current prices to raw holdings.
pub struct HoldingsEnricher {
    prices: Arc<dyn PriceSource>,
}

impl HoldingsEnricher {
    pub fn new(prices: Arc<dyn PriceSource>) -> Self {
        Self { prices }
    }

    /// Enrich every holding concurrently. Output order matches input order
    /// and the input is left untouched.
    pub async fn enrich_holdings(&self, holdings: &[Holding]) -> Vec<EnrichedHolding> {
        join_all(holdings.iter().map(|h| self.enrich_holding(h))).await
    }

    pub async fn enrich_holding(&self, holding: &Holding) -> EnrichedHolding {
        let (shares, average_cost) = resolve_position(holding);

        let ticker = holding.ticker.trim().to_uppercase();
        let fetched = self.prices.latest_price(&ticker).await;

        let (current, price_fetch_failed) = match fetched {
            Some(price) if price.is_finite() && price > 0.0 => (price, false),
            _ => {
                debug!(
                    "No usable price for {}, falling back to average cost",
                    ticker
                );
                (average_cost, true)
            }
        };

        EnrichedHolding {
            ticker: holding.ticker.clone(),
            shares,
            average_cost,
            current,
            price_fetch_failed,
            lots: holding.lots.clone(),
            image: holding.image.clone(),
            display: holding.display.clone(),
            extra: holding.extra.clone(),
        }
    }
}

/// Shares and average cost for a holding.
///
/// Lots win when they yield an average; otherwise the scalar fields are
/// parsed. Unparseable shares count as zero, an unparseable cost stays `NaN`.
pub(crate) fn resolve_position(holding: &Holding) -> (f64, f64) {
    if let Some(lots) = holding.lots.as_deref() {
        let averages = compute_lot_averages(lots);
        if let Some(average_cost) = averages.average_cost {
            return (averages.total_shares, average_cost);
        }
    }

    let shares = parse_numeric(holding.shares.as_ref());
    let shares = if shares.is_finite() && shares >= 0.0 {
        shares
    } else {
        0.0
    };
    (shares, parse_numeric(holding.average_cost.as_ref()))
}
