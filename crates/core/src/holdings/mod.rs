//! Holdings: cost-basis averaging, price enrichment and portfolio totals.

pub mod aggregation;
pub mod enrichment_service;
pub mod holdings_model;
pub mod lot_averages;


pub use aggregation::{summarize, total_invested, total_market_value, PortfolioSummary};
pub use enrichment_service::{HoldingsEnricher, PriceSource};
pub use holdings_model::{EnrichedHolding, Holding, Lot, Numeric};
pub use lot_averages::{compute_lot_averages, LotAverages};
