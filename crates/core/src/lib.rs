//! Familyfolio Core - holdings enrichment and portfolio aggregation.
//!
//! Takes raw holdings (ticker, shares, purchase lots), resolves positions
//! and cost basis, attaches current prices from a [`PriceSource`] (normally
//! the memoized quote cache in `familyfolio-market-data`) and sums the
//! results into portfolio totals.

pub mod errors;
pub mod holdings;
pub mod portfolios;

pub use holdings::{
    compute_lot_averages, summarize, total_invested, total_market_value, EnrichedHolding,
    Holding, HoldingsEnricher, Lot, LotAverages, Numeric, PortfolioSummary, PriceSource,
};
pub use portfolios::{Portfolio, PortfolioInfo, PortfolioRegistry, LOCAL_FAMILY};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
