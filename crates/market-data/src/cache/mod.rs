//! Caching layer in front of the providers.
//!
//! - [`QuoteCache`]: memoized latest prices with negative caching, in-flight
//!   de-duplication and stale-on-error fallback
//! - [`HistoryCache`]: one-hour cache of daily close series

mod history_cache;
mod outcome;
mod quote_cache;
pub(crate) mod ttl_map;

#[cfg(test)]
mod quote_cache_tests;

pub use history_cache::{HistoryCache, HistoryOptions};
pub use outcome::{resolve_outcome, PriceOutcome};
pub use quote_cache::{PriceOptions, QuoteCache, QuoteCacheConfig};
