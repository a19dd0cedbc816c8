//! Market data provider trait definitions.
//!
//! The caching layer never talks HTTP itself; it is handed implementations
//! of these traits. Production code wires in the Finnhub, Stooq or proxy
//! providers, tests wire in scripted fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{PriceQuote, YearHistory};

/// Source of latest prices.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use familyfolio_market_data::provider::QuoteProvider;
///
/// struct FixedPrice(f64);
///
/// #[async_trait]
/// impl QuoteProvider for FixedPrice {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn latest_quote(&self, _ticker: &str) -> Result<PriceQuote, MarketDataError> {
///         Ok(PriceQuote::new(self.0, "FIXED"))
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Constant identifier used in logs ("FINNHUB", "STOOQ", ...).
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for `ticker`.
    ///
    /// Performs exactly one outbound lookup and never panics. Implementations
    /// must not retry; retry policy belongs to the cache. Network errors,
    /// non-success statuses and payloads without a numeric price come back
    /// as a [`MarketDataError`] so the cache can tell transient failures
    /// from terminal ones. Callers that only want `number | false` go
    /// through [`QuoteCache`](crate::cache::QuoteCache).
    async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError>;
}

/// Source of trailing daily closes.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fetch daily closes for `ticker`, ascending by date.
    ///
    /// With `since`, rows before that date are dropped; without it the
    /// series is capped to about one trading year.
    async fn year_history(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<YearHistory, MarketDataError>;
}

/// Source of currency exchange rates.
#[async_trait]
pub trait FxRateProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Units of `to` per one unit of `from`.
    async fn fx_rate(&self, from: &str, to: &str) -> Result<f64, MarketDataError>;
}
