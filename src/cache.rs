//! In-memory TTL cache shared by the source adapters.
//!
//! Entries carry an absolute expiry. Expired entries are treated as misses on
//! read and are not swept in the background; [`MemoryCache::clear_expired`]
//! exists for callers that want to reclaim memory explicitly.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Key/value store with a per-entry time-to-live.
///
/// `get` cannot distinguish "never set" from "expired": both are `None`.
/// `set` unconditionally overwrites and resets the expiry to `now + ttl`.
pub trait CacheStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: String, value: V, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe in-memory cache. Cloning shares the underlying map.
#[derive(Debug)]
pub struct MemoryCache<V> {
    inner: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry whose expiry has passed.
    pub fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, entry| entry.is_live(now));
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V> CacheStore<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        // absurd TTLs saturate to "effectively forever"
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 60 * 60));
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, CacheEntry { value, expires_at });
    }
}
