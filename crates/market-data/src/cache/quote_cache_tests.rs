//! Tests for the memoized quote cache.
//!
//! Time-dependent cases run on a paused tokio clock so TTL boundaries can be
//! hit exactly with `tokio::time::advance`.

#[cfg(test)]
mod tests {
    use crate::cache::{PriceOptions, QuoteCache, QuoteCacheConfig};
    use crate::errors::MarketDataError;
    use crate::models::PriceQuote;
    use crate::provider::QuoteProvider;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::time::{advance, Instant};

    // =========================================================================
    // Mock providers
    // =========================================================================

    /// Answers from a script, one entry per call. An exhausted script
    /// answers `SymbolNotFound`.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<f64, MarketDataError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<f64, MarketDataError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        async fn latest_quote(&self, ticker: &str) -> Result<PriceQuote, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(result) => result.map(|price| PriceQuote::new(price, "SCRIPTED")),
                None => Err(MarketDataError::SymbolNotFound(ticker.to_string())),
            }
        }
    }

    /// Blocks every call until released.
    struct GatedProvider {
        price: f64,
        gate: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for GatedProvider {
        fn id(&self) -> &'static str {
            "GATED"
        }

        async fn latest_quote(&self, _ticker: &str) -> Result<PriceQuote, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(PriceQuote::new(self.price, "GATED"))
        }
    }

    /// Never answers.
    struct HangingProvider;

    #[async_trait]
    impl QuoteProvider for HangingProvider {
        fn id(&self) -> &'static str {
            "HANGING"
        }

        async fn latest_quote(&self, _ticker: &str) -> Result<PriceQuote, MarketDataError> {
            futures::future::pending().await
        }
    }

    fn timeout() -> MarketDataError {
        MarketDataError::Timeout {
            provider: "SCRIPTED".to_string(),
        }
    }

    fn not_found() -> MarketDataError {
        MarketDataError::HttpStatus {
            provider: "SCRIPTED".to_string(),
            status: 404,
        }
    }

    fn cache_for(provider: &Arc<ScriptedProvider>) -> QuoteCache {
        QuoteCache::new(provider.clone())
    }

    // =========================================================================
    // TTL
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_value_is_served_until_ttl_expires() {
        let provider = ScriptedProvider::new(vec![Ok(100.0), Ok(200.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("AAPL").await, Some(100.0));

        advance(Duration::from_millis(59_999)).await;
        assert_eq!(cache.get_price("AAPL").await, Some(100.0));
        assert_eq!(provider.calls(), 1);

        advance(Duration::from_millis(2)).await;
        assert_eq!(cache.get_price("AAPL").await, Some(200.0));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_stale_exactly_at_ttl() {
        let provider = ScriptedProvider::new(vec![Ok(1.0), Ok(2.0)]);
        let cache = cache_for(&provider);
        let options = PriceOptions::with_ttl(Duration::from_secs(10));

        assert_eq!(cache.get_price_with("AAPL", &options).await, Some(1.0));
        advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get_price_with("AAPL", &options).await, Some(2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_bypasses_fresh_entry() {
        let provider = ScriptedProvider::new(vec![Ok(1.0), Ok(2.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("MSFT").await, Some(1.0));
        assert_eq!(
            cache.get_price_with("MSFT", &PriceOptions::forced()).await,
            Some(2.0)
        );
        // The forced result replaced the entry.
        assert_eq!(cache.get_price("MSFT").await, Some(2.0));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_negative_ttl_differs_from_positive_ttl() {
        let provider = ScriptedProvider::new(vec![Err(not_found()), Ok(5.0)]);
        let config = QuoteCacheConfig {
            ttl: Duration::from_secs(60),
            negative_ttl: Duration::from_secs(5),
            ..QuoteCacheConfig::default()
        };
        let cache = QuoteCache::with_config(provider.clone(), config);

        assert_eq!(cache.get_price("NOPE").await, None);
        advance(Duration::from_secs(4)).await;
        assert_eq!(cache.get_price("NOPE").await, None);
        assert_eq!(provider.calls(), 1);

        advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get_price("NOPE").await, Some(5.0));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_ttl_also_bounds_negative_entries() {
        let provider = ScriptedProvider::new(vec![Err(not_found()), Ok(3.0)]);
        let config = QuoteCacheConfig {
            negative_ttl: Duration::from_secs(600),
            ..QuoteCacheConfig::default()
        };
        let cache = QuoteCache::with_config(provider.clone(), config);
        let options = PriceOptions::with_ttl(Duration::from_secs(1));

        assert_eq!(cache.get_price_with("NOPE", &options).await, None);
        advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_price_with("NOPE", &options).await, Some(3.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_negative_ttl_override() {
        let provider = ScriptedProvider::new(vec![Err(not_found()), Ok(3.0)]);
        let cache = cache_for(&provider);
        let options = PriceOptions {
            ttl: Some(Duration::from_secs(600)),
            negative_ttl: Some(Duration::from_secs(2)),
            force: false,
        };

        assert_eq!(cache.get_price_with("NOPE", &options).await, None);
        advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_price_with("NOPE", &options).await, None);
        advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get_price_with("NOPE", &options).await, Some(3.0));
    }

    // =========================================================================
    // Failure handling
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_serves_last_good_value() {
        let provider = ScriptedProvider::new(vec![Ok(77.0), Err(timeout()), Ok(80.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("TSLA").await, Some(77.0));

        advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get_price("TSLA").await, Some(77.0));
        assert_eq!(provider.calls(), 2);

        // The fallback did not refresh the entry, so the next call refetches.
        assert_eq!(cache.get_price("TSLA").await, Some(80.0));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_is_negative_cached() {
        let provider = ScriptedProvider::new(vec![Ok(77.0), Err(not_found()), Ok(90.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("TSLA").await, Some(77.0));

        advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get_price("TSLA").await, None);
        assert_eq!(cache.get_price("TSLA").await, None);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_without_history_is_negative_cached() {
        let provider = ScriptedProvider::new(vec![Err(timeout()), Ok(1.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("NEW").await, None);
        assert_eq!(cache.get_price("NEW").await, None);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_refresh_does_not_fall_back() {
        let provider = ScriptedProvider::new(vec![Ok(77.0), Err(timeout())]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("TSLA").await, Some(77.0));
        assert_eq!(
            cache.get_price_with("TSLA", &PriceOptions::forced()).await,
            None
        );
        assert_eq!(cache.get_price("TSLA").await, None);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let cache = QuoteCache::new(Arc::new(HangingProvider));
        let start = Instant::now();

        assert_eq!(cache.get_price("SLOW").await, None);
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_calls_share_one_fetch() {
        let provider = Arc::new(GatedProvider {
            price: 999.0,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        });
        let cache = QuoteCache::new(provider.clone());
        let default_options = PriceOptions::default();
        let forced = PriceOptions::forced();

        let calls = futures::future::join_all((0..5).map(|i| {
            let options = if i == 4 { &forced } else { &default_options };
            cache.get_price_with("AMZN", options)
        }));
        let release = async {
            tokio::task::yield_now().await;
            provider.gate.notify_one();
        };

        let (prices, _) = tokio::join!(calls, release);

        assert_eq!(prices, vec![Some(999.0); 5]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.get_price("AMZN").await, Some(999.0));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    // =========================================================================
    // Housekeeping
    // =========================================================================

    #[tokio::test]
    async fn test_empty_ticker_is_not_fetched() {
        let provider = ScriptedProvider::new(vec![Ok(1.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("").await, None);
        assert_eq!(provider.calls(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let provider = ScriptedProvider::new(vec![Ok(1.0), Ok(2.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("AAPL").await, Some(1.0));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_price("AAPL").await, Some(2.0));
    }

    #[tokio::test]
    async fn test_tickers_are_cached_independently() {
        let provider = ScriptedProvider::new(vec![Ok(1.0), Ok(2.0)]);
        let cache = cache_for(&provider);

        assert_eq!(cache.get_price("AAPL").await, Some(1.0));
        assert_eq!(cache.get_price("MSFT").await, Some(2.0));
        assert_eq!(cache.get_price("AAPL").await, Some(1.0));

        cache.invalidate("AAPL");
        assert_eq!(cache.len(), 1);
    }
}
