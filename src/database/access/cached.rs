use super::direct::DirectDatabaseAccess;
use super::{DatabaseAccess, DatabaseAccessConfig};
use crate::database::Database;
use crate::database::cache::{CacheConfig, ValueCache};
use crate::document::Document;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Key/value access that remembers looked-up values.
///
/// Values written through [`set_value`](DatabaseAccess::set_value) are cached
/// after the write succeeds. A miss in [`get_value_or`](DatabaseAccess::get_value_or)
/// caches the default when `cache_defaults` is set; backend errors are never cached.
/// Writes made to the table by anything else are not seen until the entry is
/// invalidated or expires.
pub struct CachedDatabaseAccess<V> {
    direct: DirectDatabaseAccess<V>,
    cache: ValueCache<V>,
    cache_defaults: bool,
}

impl<V: Clone> CachedDatabaseAccess<V> {
    pub fn new<F>(
        database: Database,
        config: DatabaseAccessConfig,
        cache_config: &CacheConfig,
        mapper: F,
    ) -> Self
    where
        F: Fn(&Document, &str) -> Option<V> + Send + Sync + 'static,
    {
        Self::from_direct(DirectDatabaseAccess::new(database, config, mapper), cache_config)
    }

    /// Puts a cache in front of `direct`.
    #[must_use]
    pub fn from_direct(direct: DirectDatabaseAccess<V>, cache_config: &CacheConfig) -> Self {
        Self {
            direct,
            cache: ValueCache::new(cache_config),
            cache_defaults: cache_config.cache_defaults,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DatabaseAccessConfig {
        self.direct.config()
    }

    #[must_use]
    pub const fn cache(&self) -> &ValueCache<V> {
        &self.cache
    }

    /// Forgets `key` so the next read goes to the database.
    pub fn invalidate(&self, key: &str) -> bool {
        self.cache.invalidate(key)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl CachedDatabaseAccess<String> {
    #[must_use]
    pub fn for_string(
        database: Database,
        config: DatabaseAccessConfig,
        cache_config: &CacheConfig,
    ) -> Self {
        Self::from_direct(DirectDatabaseAccess::for_string(database, config), cache_config)
    }
}

impl<V> fmt::Debug for CachedDatabaseAccess<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedDatabaseAccess")
            .field("direct", &self.direct)
            .field("cache_defaults", &self.cache_defaults)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V> DatabaseAccess<V> for CachedDatabaseAccess<V>
where
    V: Clone + Into<Value> + Send + Sync + 'static,
{
    async fn get_value(&self, key: &str) -> Result<V> {
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }
        let value = self.direct.get_value(key).await?;
        self.cache.insert(key, value.clone());
        Ok(value)
    }

    async fn get_value_or(&self, key: &str, default: V) -> V {
        if let Some(value) = self.cache.get(key) {
            return value;
        }
        match self.direct.lookup(key).await {
            Ok(Some(value)) => {
                self.cache.insert(key, value.clone());
                value
            }
            Ok(None) => {
                if self.cache_defaults {
                    debug!(key, "Caching default value");
                    self.cache.insert(key, default.clone());
                }
                default
            }
            Err(error) => {
                warn!(table = %self.config().table, key, %error, "Lookup failed, using default");
                default
            }
        }
    }

    async fn get_optional(&self, key: &str) -> Result<Option<V>> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value));
        }
        let value = self.direct.lookup(key).await?;
        if let Some(value) = &value {
            self.cache.insert(key, value.clone());
        }
        Ok(value)
    }

    async fn set_value(&self, key: &str, value: V) -> Result<()> {
        self.direct.set_value(key, value.clone()).await?;
        self.cache.insert(key, value);
        Ok(())
    }
}
