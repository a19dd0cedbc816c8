//! Familyfolio Market Data Crate
//!
//! Latest prices, trailing daily history and FX rates for the tickers held
//! in Familyfolio portfolios.
//!
//! # Overview
//!
//! - Providers: Finnhub (quotes), Stooq (quotes, history, FX) and the
//!   Familyfolio proxy endpoints
//! - A memoized quote cache with negative caching, in-flight
//!   de-duplication and stale-on-error fallback
//! - A one-hour history cache
//! - Optional conversion of quotes into a single reporting currency
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   QuoteCache     |  (TTL, negative TTL, dedupe, stale fallback)
//! +------------------+
//!          |
//!          v
//! +--------------------------+
//! | ConvertingQuoteProvider  |  (optional, uses FxRates)
//! +--------------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (Finnhub, Stooq, proxy)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteCache`] - Latest price lookups, `Option<f64>` per ticker
//! - [`HistoryCache`] - Daily closes as [`YearHistory`]
//! - [`FxRates`] - Cached exchange rates
//! - [`MarketDataError`] - Provider failures, classified transient or terminal

pub mod cache;
pub mod constants;
pub mod errors;
pub mod fx;
pub mod models;
pub mod provider;

pub use cache::{
    HistoryCache, HistoryOptions, PriceOptions, PriceOutcome, QuoteCache, QuoteCacheConfig,
};
pub use errors::{FailureClass, MarketDataError};
pub use fx::{ConvertingQuoteProvider, FxRates};
pub use models::{Currency, PricePoint, PriceQuote, YearHistory};

pub use provider::finnhub::FinnhubProvider;
pub use provider::proxy::ProxyProvider;
pub use provider::stooq::StooqProvider;
pub use provider::{FxRateProvider, HistoryProvider, QuoteProvider};
