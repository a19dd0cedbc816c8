//! Currency conversion for quotes.
//!
//! [`FxRates`] caches `<FROM><TO>` rates for a few minutes. Failed lookups
//! are not cached. [`ConvertingQuoteProvider`] wraps any [`QuoteProvider`]
//! and restates its prices in a target currency.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::cache::ttl_map::TtlMap;
use crate::constants::DEFAULT_FX_TTL;
use crate::errors::MarketDataError;
use crate::models::{Currency, PriceQuote};
use crate::provider::{FxRateProvider, QuoteProvider};

pub struct FxRates {
    provider: Arc<dyn FxRateProvider>,
    rates: TtlMap<f64>,
}

impl FxRates {
    pub fn new(provider: Arc<dyn FxRateProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_FX_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn FxRateProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            rates: TtlMap::new(ttl),
        }
    }

    /// Units of `to` per unit of `from`, `None` when no rate is available.
    pub async fn rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        if from == to {
            return Some(1.0);
        }

        let pair = format!("{}{}", from, to);
        if let Some(rate) = self.rates.get_fresh(&pair) {
            return Some(rate);
        }

        match self.provider.fx_rate(&from, &to).await {
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                debug!("FX rate {} = {}", pair, rate);
                self.rates.insert(pair, rate);
                Some(rate)
            }
            Ok(rate) => {
                warn!("Ignoring unusable FX rate {} for {}", rate, pair);
                None
            }
            Err(e) => {
                warn!("FX lookup for {} via {} failed: {}", pair, self.provider.id(), e);
                None
            }
        }
    }

    /// Convert `amount` from one currency to another.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        self.rate(from, to).await.map(|rate| amount * rate)
    }
}

/// Quote provider that restates prices in a single target currency.
///
/// Quotes without a currency are assumed to already be in the target
/// currency and pass through unchanged.
pub struct ConvertingQuoteProvider {
    inner: Arc<dyn QuoteProvider>,
    fx: Arc<FxRates>,
    target: Currency,
}

impl ConvertingQuoteProvider {
    pub fn new(
        inner: Arc<dyn QuoteProvider>,
        fx: Arc<FxRates>,
        target: impl Into<Currency>,
    ) -> Self {
        let target: Currency = target.into();
        Self {
            inner,
            fx,
            target: Currency::Owned(target.to_uppercase()),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl QuoteProvider for ConvertingQuoteProvider {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
        let quote = self.inner.latest_quote(ticker).await?;

        let Some(from) = quote
            .currency
            .as_deref()
            .filter(|c| !c.eq_ignore_ascii_case(&self.target))
            .map(str::to_uppercase)
        else {
            return Ok(quote);
        };

        let price = self
            .fx
            .convert(quote.price, &from, &self.target)
            .await
            .ok_or_else(|| MarketDataError::FxRateUnavailable {
                from: from.clone(),
                to: self.target.to_string(),
            })?;

        Ok(PriceQuote {
            price,
            currency: Some(self.target.clone()),
            source: quote.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::advance;

    struct FakeRates {
        rates: Mutex<HashMap<String, f64>>,
        calls: AtomicUsize,
    }

    impl FakeRates {
        fn new(rates: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                rates: Mutex::new(rates.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FxRateProvider for FakeRates {
        fn id(&self) -> &'static str {
            "FAKE"
        }

        async fn fx_rate(&self, from: &str, to: &str) -> Result<f64, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rates
                .lock()
                .unwrap()
                .get(&format!("{}{}", from, to))
                .copied()
                .ok_or_else(|| MarketDataError::FxRateUnavailable {
                    from: from.to_string(),
                    to: to.to_string(),
                })
        }
    }

    struct FixedQuote(PriceQuote);

    #[async_trait]
    impl QuoteProvider for FixedQuote {
        fn id(&self) -> &'static str {
            "FIXED"
        }

        async fn latest_quote(&self, _ticker: &str) -> Result<PriceQuote, MarketDataError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_same_currency_needs_no_lookup() {
        let provider = FakeRates::new(&[]);
        let fx = FxRates::new(provider.clone());

        assert_eq!(fx.rate("usd", "USD").await, Some(1.0));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rates_are_cached_for_five_minutes() {
        let provider = FakeRates::new(&[("HKDUSD", 0.128)]);
        let fx = FxRates::new(provider.clone());

        assert_eq!(fx.rate("HKD", "USD").await, Some(0.128));
        advance(Duration::from_secs(299)).await;
        assert_eq!(fx.rate("hkd", "usd").await, Some(0.128));
        assert_eq!(provider.calls(), 1);

        advance(Duration::from_secs(2)).await;
        fx.rate("HKD", "USD").await;
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_rate_is_not_cached() {
        let provider = FakeRates::new(&[]);
        let fx = FxRates::new(provider.clone());

        assert_eq!(fx.rate("JPY", "USD").await, None);
        assert_eq!(fx.rate("JPY", "USD").await, None);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_converting_provider_restates_foreign_quotes() {
        let fx = Arc::new(FxRates::new(FakeRates::new(&[("HKDUSD", 0.125)])));
        let inner = Arc::new(FixedQuote(
            PriceQuote::new(400.0, "STOOQ").with_currency("HKD"),
        ));
        let provider = ConvertingQuoteProvider::new(inner, fx, "usd");

        let quote = provider.latest_quote("0700.HK").await.unwrap();
        assert_eq!(quote.price, 50.0);
        assert_eq!(quote.currency.as_deref(), Some("USD"));
        assert_eq!(quote.source, "STOOQ");
    }

    #[tokio::test]
    async fn test_converting_provider_passes_through_target_and_unknown_currency() {
        let rates = FakeRates::new(&[]);
        let fx = Arc::new(FxRates::new(rates.clone()));

        let usd = ConvertingQuoteProvider::new(
            Arc::new(FixedQuote(PriceQuote::new(10.0, "STOOQ").with_currency("USD"))),
            fx.clone(),
            "USD",
        );
        assert_eq!(usd.latest_quote("AAPL").await.unwrap().price, 10.0);

        let unknown = ConvertingQuoteProvider::new(
            Arc::new(FixedQuote(PriceQuote::new(11.0, "FINNHUB"))),
            fx,
            "USD",
        );
        assert_eq!(unknown.latest_quote("AAPL").await.unwrap().price, 11.0);
        assert_eq!(rates.calls(), 0);
    }

    #[tokio::test]
    async fn test_converting_provider_fails_without_rate() {
        let fx = Arc::new(FxRates::new(FakeRates::new(&[])));
        let provider = ConvertingQuoteProvider::new(
            Arc::new(FixedQuote(PriceQuote::new(1000.0, "STOOQ").with_currency("JPY"))),
            fx,
            "USD",
        );

        let err = provider.latest_quote("7203.JP").await.unwrap_err();
        assert!(matches!(err, MarketDataError::FxRateUnavailable { .. }));
        assert!(!err.is_transient());
    }
}
