//! Memoized latest-price lookups.
//!
//! Every ticker lives in exactly one [`Slot`]: either a settled value with the
//! instant it was fetched, or an in-flight fetch that concurrent callers
//! join. Negative results (`None`) are cached too, under their own TTL.
//!
//! The in-flight fetch runs on its own task and writes the slot itself, so a
//! caller that gives up early does not cancel the refresh for everyone else.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use tokio::time::Instant;

use super::outcome::{resolve_outcome, PriceOutcome};
use crate::constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_QUOTE_TTL};
use crate::errors::MarketDataError;
use crate::provider::QuoteProvider;

/// Cache-wide defaults.
#[derive(Clone, Debug)]
pub struct QuoteCacheConfig {
    /// How long a successful price is served without refetching.
    pub ttl: Duration,
    /// How long a miss (`None`) is served without refetching.
    pub negative_ttl: Duration,
    /// Upper bound on a single provider call.
    pub fetch_timeout: Duration,
}

impl Default for QuoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_QUOTE_TTL,
            negative_ttl: DEFAULT_QUOTE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Per-call overrides.
#[derive(Clone, Debug, Default)]
pub struct PriceOptions {
    /// Overrides the cache TTL for this lookup.
    pub ttl: Option<Duration>,
    /// Overrides the negative TTL. When unset but `ttl` is set, `ttl` is used.
    pub negative_ttl: Option<Duration>,
    /// Skip the freshness check. Still joins a fetch already in flight.
    pub force: bool,
}

impl PriceOptions {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CachedPrice {
    value: Option<f64>,
    fetched_at: Instant,
}

impl CachedPrice {
    fn is_fresh(&self, now: Instant, ttl: Duration, negative_ttl: Duration) -> bool {
        let limit = if self.value.is_some() { ttl } else { negative_ttl };
        now.saturating_duration_since(self.fetched_at) < limit
    }
}

type SharedFetch = Shared<BoxFuture<'static, Option<f64>>>;

#[derive(Clone)]
enum Slot {
    Ready(CachedPrice),
    Pending { id: u64, fetch: SharedFetch },
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

fn lock_slots(slots: &Mutex<HashMap<String, Slot>>) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(|poisoned| {
        warn!("Quote cache mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Latest-price cache in front of a [`QuoteProvider`].
pub struct QuoteCache {
    provider: Arc<dyn QuoteProvider>,
    config: QuoteCacheConfig,
    slots: Slots,
    next_fetch_id: AtomicU64,
}

impl QuoteCache {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self::with_config(provider, QuoteCacheConfig::default())
    }

    pub fn with_config(provider: Arc<dyn QuoteProvider>, config: QuoteCacheConfig) -> Self {
        Self {
            provider,
            config,
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_fetch_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &QuoteCacheConfig {
        &self.config
    }

    /// Latest price for `ticker` with the cache defaults.
    pub async fn get_price(&self, ticker: &str) -> Option<f64> {
        self.get_price_with(ticker, &PriceOptions::default()).await
    }

    /// Latest price for `ticker`, `None` when no price can be had.
    ///
    /// The ticker is used as given. An empty ticker never reaches the
    /// provider and is not cached.
    pub async fn get_price_with(&self, ticker: &str, options: &PriceOptions) -> Option<f64> {
        if ticker.is_empty() {
            return None;
        }

        let (ttl, negative_ttl) = self.effective_ttls(options);

        let fetch = {
            let mut slots = lock_slots(&self.slots);
            match slots.get(ticker).cloned() {
                Some(Slot::Ready(entry))
                    if !options.force && entry.is_fresh(Instant::now(), ttl, negative_ttl) =>
                {
                    debug!("Quote cache hit for {}", ticker);
                    return entry.value;
                }
                Some(Slot::Pending { fetch, .. }) => {
                    debug!("Joining in-flight quote fetch for {}", ticker);
                    fetch
                }
                existing => {
                    // A forced refresh never falls back to what it replaces.
                    let previous = match existing {
                        Some(Slot::Ready(entry)) if !options.force => Some(entry),
                        _ => None,
                    };
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let fetch = self.start_fetch(ticker, id, previous);
                    slots.insert(
                        ticker.to_string(),
                        Slot::Pending {
                            id,
                            fetch: fetch.clone(),
                        },
                    );
                    fetch
                }
            }
        };

        fetch.await
    }

    fn effective_ttls(&self, options: &PriceOptions) -> (Duration, Duration) {
        let ttl = options.ttl.unwrap_or(self.config.ttl);
        let negative_ttl = options.negative_ttl.unwrap_or(if options.ttl.is_some() {
            ttl
        } else {
            self.config.negative_ttl
        });
        (ttl, negative_ttl)
    }

    /// Spawn the provider call. The returned future resolves once the slot
    /// has been settled.
    fn start_fetch(&self, ticker: &str, id: u64, previous: Option<CachedPrice>) -> SharedFetch {
        let provider = Arc::clone(&self.provider);
        let slots = Arc::clone(&self.slots);
        let timeout = self.config.fetch_timeout;
        let key = ticker.to_string();

        let task = tokio::spawn({
            let slots = Arc::clone(&slots);
            let key = key.clone();
            async move {
                let fetched = match tokio::time::timeout(timeout, provider.latest_quote(&key)).await {
                    Ok(result) => result,
                    Err(_) => Err(MarketDataError::Timeout {
                        provider: provider.id().to_string(),
                    }),
                };

                if let Err(e) = &fetched {
                    warn!("Quote fetch for {} via {} failed: {}", key, provider.id(), e);
                }

                let outcome = resolve_outcome(fetched, previous.and_then(|p| p.value));
                settle(&slots, &key, id, outcome, previous);
                outcome
            }
        });

        async move {
            match task.await {
                Ok(outcome) => outcome.into_price(),
                Err(e) => {
                    warn!("Quote fetch task for {} did not complete: {}", key, e);
                    let mut slots = lock_slots(&slots);
                    if matches!(slots.get(&key), Some(Slot::Pending { id: current, .. }) if *current == id)
                    {
                        slots.remove(&key);
                    }
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Drop every cached value. Fetches already in flight still complete but
    /// no longer write back.
    pub fn clear(&self) {
        lock_slots(&self.slots).clear();
    }

    /// Drop the cached value for one ticker.
    pub fn invalidate(&self, ticker: &str) {
        lock_slots(&self.slots).remove(ticker);
    }

    pub fn len(&self) -> usize {
        lock_slots(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write a finished fetch back, unless its slot was cleared or replaced.
fn settle(
    slots: &Mutex<HashMap<String, Slot>>,
    key: &str,
    id: u64,
    outcome: PriceOutcome,
    previous: Option<CachedPrice>,
) {
    let mut slots = lock_slots(slots);
    let owns_slot = matches!(slots.get(key), Some(Slot::Pending { id: current, .. }) if *current == id);
    if !owns_slot {
        return;
    }

    let entry = match (outcome, previous) {
        // Serving the last good value leaves it exactly as it was.
        (PriceOutcome::Stale(_), Some(previous)) => previous,
        _ => CachedPrice {
            value: outcome.into_price(),
            fetched_at: Instant::now(),
        },
    };
    slots.insert(key.to_string(), Slot::Ready(entry));
}
