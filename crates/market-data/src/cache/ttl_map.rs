//! Plain keyed TTL store used by the history and FX caches.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::warn;
use tokio::time::Instant;

pub(crate) struct TtlMap<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlMap<V> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, V)>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("TTL map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Value for `key` if it was stored less than `ttl` ago.
    pub(crate) fn get_fresh(&self, key: &str) -> Option<V> {
        let entries = self.lock();
        let (stored_at, value) = entries.get(key)?;
        (stored_at.elapsed() < self.ttl).then(|| value.clone())
    }

    pub(crate) fn insert(&self, key: String, value: V) {
        self.lock().insert(key, (Instant::now(), value));
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}
