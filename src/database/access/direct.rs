use super::{DatabaseAccess, DatabaseAccessConfig, ValueMapper};
use crate::database::{Database, SetAction, WhereAction};
use crate::document::Document;
use crate::errors::{DatabaseError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Key/value access that hits the database on every call.
pub struct DirectDatabaseAccess<V> {
    database: Database,
    config: DatabaseAccessConfig,
    mapper: ValueMapper<V>,
}

impl<V> DirectDatabaseAccess<V> {
    pub fn new<F>(database: Database, config: DatabaseAccessConfig, mapper: F) -> Self
    where
        F: Fn(&Document, &str) -> Option<V> + Send + Sync + 'static,
    {
        Self {
            database,
            config,
            mapper: Arc::new(mapper),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DatabaseAccessConfig {
        &self.config
    }

    /// Looks up `key`, returning `None` when no row matches or the value column is empty.
    pub(crate) async fn lookup(&self, key: &str) -> Result<Option<V>> {
        let result = self
            .database
            .query(self.config.table.as_str())
            .where_eq(self.config.key_field.as_str(), key)
            .select([self.config.value_field.as_str()])
            .limit(1)
            .execute()
            .await?;
        Ok(result
            .first()
            .and_then(|row| (self.mapper)(row, &self.config.value_field)))
    }

    fn no_such_entry(&self, key: &str) -> DatabaseError {
        DatabaseError::NoSuchEntry {
            table: self.config.table.clone(),
            field: self.config.key_field.clone(),
            key: key.to_string(),
        }
    }
}

impl DirectDatabaseAccess<String> {
    #[must_use]
    pub fn for_string(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_string)
    }
}

impl DirectDatabaseAccess<i32> {
    #[must_use]
    pub fn for_int(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_int)
    }
}

impl DirectDatabaseAccess<i64> {
    #[must_use]
    pub fn for_long(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_long)
    }
}

impl DirectDatabaseAccess<f64> {
    #[must_use]
    pub fn for_double(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_double)
    }
}

impl DirectDatabaseAccess<bool> {
    #[must_use]
    pub fn for_bool(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_bool)
    }
}

impl DirectDatabaseAccess<Document> {
    #[must_use]
    pub fn for_document(database: Database, config: DatabaseAccessConfig) -> Self {
        Self::new(database, config, Document::get_document)
    }
}

impl<V> fmt::Debug for DirectDatabaseAccess<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectDatabaseAccess")
            .field("database", &self.database)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<V> DatabaseAccess<V> for DirectDatabaseAccess<V>
where
    V: Into<Value> + Send + Sync + 'static,
{
    async fn get_value(&self, key: &str) -> Result<V> {
        self.lookup(key)
            .await?
            .ok_or_else(|| self.no_such_entry(key).into())
    }

    async fn get_value_or(&self, key: &str, default: V) -> V {
        match self.lookup(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(error) => {
                warn!(table = %self.config.table, key, %error, "Lookup failed, using default");
                default
            }
        }
    }

    async fn get_optional(&self, key: &str) -> Result<Option<V>> {
        self.lookup(key).await
    }

    async fn set_value(&self, key: &str, value: V) -> Result<()> {
        self.database
            .upsert(self.config.table.as_str())
            .where_eq(self.config.key_field.as_str(), key)
            .set(self.config.value_field.as_str(), value)
            .execute()
            .await
    }
}
