//! In-process value cache used by [`CachedDatabaseAccess`](super::access::CachedDatabaseAccess).
//!
//! Entries are evicted least-recently-used once `max_entries` is reached and
//! expire after `ttl_seconds`. With neither set the cache grows without bound
//! and never expires, which suits small per-guild tables.

use lru::LruCache;
use parking_lot::RwLock;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Cache configuration, read from the `[cache]` table of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached keys; unbounded when absent or zero
    pub max_entries: Option<usize>,
    /// Seconds after which an entry is reloaded; never when absent
    pub ttl_seconds: Option<u64>,
    /// Whether a miss caches the caller's default value
    pub cache_defaults: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            ttl_seconds: None,
            cache_defaults: true,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    #[must_use]
    pub const fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub const fn with_cache_defaults(mut self, cache_defaults: bool) -> Self {
        self.cache_defaults = cache_defaults;
        self
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug)]
struct Inner<V> {
    entries: LruCache<String, Entry<V>>,
    stats: CacheStats,
}

/// A thread-safe string-keyed cache.
#[derive(Debug)]
pub struct ValueCache<V> {
    inner: RwLock<Inner<V>>,
    ttl: Option<Duration>,
}

impl<V: Clone> ValueCache<V> {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let entries = config
            .max_entries
            .and_then(NonZeroUsize::new)
            .map_or_else(LruCache::unbounded, LruCache::new);
        Self {
            inner: RwLock::new(Inner {
                entries,
                stats: CacheStats::default(),
            }),
            ttl: config.ttl(),
        }
    }

    fn is_fresh(&self, entry: &Entry<V>) -> bool {
        self.ttl.is_none_or(|ttl| entry.stored_at.elapsed() < ttl)
    }

    /// Returns the cached value for `key`, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write();
        let fresh = inner
            .entries
            .get(key)
            .map(|entry| self.is_fresh(entry).then(|| entry.value.clone()));
        match fresh {
            Some(Some(value)) => {
                inner.stats.hits += 1;
                Some(value)
            }
            Some(None) => {
                inner.entries.pop(key);
                inner.stats.misses += 1;
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.inner.write().entries.put(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes `key`, returning whether it was cached.
    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.write().entries.pop(key).is_some()
    }

    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_unbounded_and_caches_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, None);
        assert_eq!(config.ttl(), None);
        assert!(config.cache_defaults);
    }

    #[test]
    fn test_get_insert_and_stats() {
        let cache = ValueCache::new(&CacheConfig::default());
        assert_eq!(cache.get("1"), None);
        cache.insert("1", "!".to_string());
        assert_eq!(cache.get("1").as_deref(), Some("!"));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert!((cache.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ValueCache::new(&CacheConfig::default().with_max_entries(2));
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_zero_capacity_means_unbounded() {
        let cache = ValueCache::new(&CacheConfig::default().with_max_entries(0));
        for i in 0..100 {
            cache.insert(i.to_string(), i);
        }
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ValueCache::new(&CacheConfig::default().with_ttl_seconds(0));
        cache.insert("a", 1);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = ValueCache::new(&CacheConfig::default());
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
