//! Cached one-year history lookups.
//!
//! Results are keyed by `TICKER` or `TICKER|YYYY-MM-DD` when a `since` date is
//! given. Failed lookups are cached as [`YearHistory::failed`] for the same
//! TTL so a broken ticker is not hammered on every render.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, warn};

use super::ttl_map::TtlMap;
use crate::constants::DEFAULT_HISTORY_TTL;
use crate::models::YearHistory;
use crate::provider::HistoryProvider;

#[derive(Clone, Debug, Default)]
pub struct HistoryOptions {
    /// Drop closes before this date.
    pub since: Option<NaiveDate>,
    /// Ignore any cached result.
    pub force: bool,
}

impl HistoryOptions {
    pub fn since(date: NaiveDate) -> Self {
        Self {
            since: Some(date),
            force: false,
        }
    }
}

pub struct HistoryCache {
    provider: Arc<dyn HistoryProvider>,
    entries: TtlMap<YearHistory>,
}

impl HistoryCache {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self::with_ttl(provider, DEFAULT_HISTORY_TTL)
    }

    pub fn with_ttl(provider: Arc<dyn HistoryProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            entries: TtlMap::new(ttl),
        }
    }

    /// Daily closes for `ticker`. Never fails; a failed lookup yields a
    /// history with `error` set and no prices.
    pub async fn get_year_history(&self, ticker: &str, options: &HistoryOptions) -> YearHistory {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return YearHistory::empty();
        }

        let key = cache_key(&ticker, options.since);
        if !options.force {
            if let Some(history) = self.entries.get_fresh(&key) {
                debug!("History cache hit for {}", key);
                return history;
            }
        }

        let history = match self.provider.year_history(&ticker, options.since).await {
            Ok(mut history) => {
                history.ticker.get_or_insert_with(|| ticker.clone());
                if history.since.is_none() {
                    history.since = options.since;
                }
                history
            }
            Err(e) => {
                warn!(
                    "History lookup for {} via {} failed: {}",
                    key,
                    self.provider.id(),
                    e
                );
                YearHistory {
                    ticker: Some(ticker.clone()),
                    ..YearHistory::failed(options.since)
                }
            }
        };

        self.entries.insert(key, history.clone());
        history
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(ticker: &str, since: Option<NaiveDate>) -> String {
    match since {
        Some(since) => format!("{}|{}", ticker, since.format("%Y-%m-%d")),
        None => ticker.to_string(),
    }
}
