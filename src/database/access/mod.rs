//! Key/value access to a single column of a table.
//!
//! A [`DatabaseAccessConfig`] names the table, the key column and the value
//! column; [`DirectDatabaseAccess`] reads and writes through the database on
//! every call and [`CachedDatabaseAccess`] keeps looked-up values in memory.

mod cached;
mod direct;

pub use cached::CachedDatabaseAccess;
pub use direct::DirectDatabaseAccess;

use crate::document::Document;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Which table and columns a key/value access reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseAccessConfig {
    pub table: String,
    pub key_field: String,
    pub value_field: String,
}

impl DatabaseAccessConfig {
    pub fn new(
        table: impl Into<String>,
        key_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key_field: key_field.into(),
            value_field: value_field.into(),
        }
    }
}

/// Extracts a typed value from a row, given the value column.
pub type ValueMapper<V> = Arc<dyn Fn(&Document, &str) -> Option<V> + Send + Sync>;

/// Typed key/value lookups.
#[async_trait]
pub trait DatabaseAccess<V>: Send + Sync
where
    V: Send + 'static,
{
    /// The value stored for `key`.
    ///
    /// # Errors
    /// Returns [`DatabaseError::NoSuchEntry`](crate::errors::DatabaseError::NoSuchEntry)
    /// when no row has the key, or the backend's error.
    async fn get_value(&self, key: &str) -> Result<V>;

    /// The value for `key`, or `default` when missing. Backend errors are
    /// logged and also yield `default`.
    async fn get_value_or(&self, key: &str, default: V) -> V;

    /// # Errors
    /// Returns the backend's error; a missing row is `Ok(None)`.
    async fn get_optional(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` for `key`, inserting the row if needed.
    ///
    /// # Errors
    /// Returns the backend's error.
    async fn set_value(&self, key: &str, value: V) -> Result<()>;
}
