//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider`, `HistoryProvider` and `FxRateProvider` traits
//! - Concrete providers: Finnhub (JSON quote), Stooq (CSV quote, history
//!   and FX) and the proxy endpoints served by the Familyfolio server
//! - Shared numeric parsing for loosely typed upstream payloads
//!
//! Providers only translate one upstream shape into [`PriceQuote`] /
//! [`YearHistory`](crate::models::YearHistory). Caching, timeouts and
//! fallback live in [`crate::cache`].
//!
//! [`PriceQuote`]: crate::models::PriceQuote

mod numeric;
mod traits;

pub mod finnhub;
pub mod proxy;
pub mod stooq;

pub use numeric::{parse_leading_float, parse_price_value};
pub use traits::{FxRateProvider, HistoryProvider, QuoteProvider};
