//! In-memory memoization with per-entry expiry.
//!
//! Entries are keyed by [`CacheKey`] (function identity plus arguments) and
//! expire after the TTL given at insertion. [`CacheStore::clear`] drops every
//! entry regardless of key, which is what the manual refresh action does.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Defines how a fetch interacts with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, fetch and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always fetch, bypassing any cached entry, and write the new result.
    Refresh,
    /// Always fetch and do not read from or write to the cache.
    Bypass,
}

/// Composite cache key: the memoized function plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    function: &'static str,
    args: Vec<String>,
}

impl CacheKey {
    pub fn new<I, S>(function: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn function(&self) -> &'static str {
        self.function
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, self.args.join(","))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<CacheKey, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> CacheInner<V> {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &CacheKey, now: Instant) -> Option<V> {
        self.map.get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: CacheKey, value: V, ttl_override: Option<Duration>, now: Instant) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return;
        }
        let expires_at = now + ttl;
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self, now: Instant) {
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe in-memory cache.
#[derive(Debug, Clone)]
pub struct CacheStore<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
}

impl<V: Clone> CacheStore<V> {
    /// Create a cache store with a default TTL used when `put` gets no override.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Get the cached value for `key` if it exists and has not expired.
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now()).await
    }

    pub async fn get_at(&self, key: &CacheKey, now: Instant) -> Option<V> {
        let store = self.inner.read().await;
        store.get(key, now)
    }

    /// Put a value into the cache.
    ///
    /// A zero TTL (override or default) makes this a no-op.
    pub async fn put(&self, key: CacheKey, value: V, ttl_override: Option<Duration>) {
        self.put_at(key, value, ttl_override, Instant::now()).await;
    }

    pub async fn put_at(
        &self,
        key: CacheKey,
        value: V,
        ttl_override: Option<Duration>,
        now: Instant,
    ) {
        let mut store = self.inner.write().await;
        store.put(key, value, ttl_override, now);
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired(Instant::now());
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
