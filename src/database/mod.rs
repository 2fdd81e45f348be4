//! Backend-independent database actions.
//!
//! [`Database`] is a cheap, cloneable handle over one [`Backend`]. It hands out
//! builders for queries, insertions, updates, deletions and upserts; the
//! same builder code runs against SQL databases through `SeaORM` and against
//! MongoDB.
//!
//! ```no_run
//! # async fn demo(database: guildkit::database::Database) -> guildkit::errors::Result<()> {
//! use guildkit::database::{SetAction, WhereAction};
//!
//! database
//!     .upsert("guilds")
//!     .where_eq("guild", "1234")
//!     .set("prefix", "?")
//!     .execute()
//!     .await?;
//! let prefix = database
//!     .query("guilds")
//!     .where_eq("guild", "1234")
//!     .execute()
//!     .await?
//!     .first()
//!     .and_then(|row| row.get_string("prefix"));
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod action;
pub mod backend;
pub mod cache;
pub mod column;
pub mod mongo;
pub mod result;
pub mod sql;
pub mod where_clause;

pub use access::{
    CachedDatabaseAccess, DatabaseAccess, DatabaseAccessConfig, DirectDatabaseAccess,
};
pub use action::{
    DatabaseDeletion, DatabaseInsertion, DatabaseQuery, DatabaseUpdate, DatabaseUpsert, Order,
    OrderBy, SetAction, WhereAction,
};
pub use backend::{Backend, upsert_by_query};
pub use cache::{CacheConfig, CacheStats, ValueCache};
pub use column::{ColumnType, SqlColumn};
pub use mongo::MongoBackend;
pub use result::ExecutedQuery;
pub use sql::SqlBackend;
pub use where_clause::{Comparison, Filter, Where};

use crate::config::database::{BackendKind, DatabaseConfig};
use crate::errors::Result;
use std::sync::Arc;
use tracing::instrument;

/// Handle to a connected backend.
#[derive(Debug, Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
}

impl Database {
    /// Connects to the backend described by `config`.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    #[instrument(skip(config), fields(backend = ?config.backend))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let backend: Arc<dyn Backend> = match config.backend {
            BackendKind::Sql => Arc::new(SqlBackend::connect(&config.url).await?),
            BackendKind::MongoDb => {
                Arc::new(MongoBackend::connect(&config.url, &config.name).await?)
            }
        };
        Ok(Self { backend })
    }

    #[must_use]
    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn query(&self, table: impl Into<String>) -> DatabaseQuery {
        DatabaseQuery::new(Arc::clone(&self.backend), table)
    }

    pub fn insert(&self, table: impl Into<String>) -> DatabaseInsertion {
        DatabaseInsertion::new(Arc::clone(&self.backend), table)
    }

    pub fn update(&self, table: impl Into<String>) -> DatabaseUpdate {
        DatabaseUpdate::new(Arc::clone(&self.backend), table)
    }

    pub fn delete(&self, table: impl Into<String>) -> DatabaseDeletion {
        DatabaseDeletion::new(Arc::clone(&self.backend), table)
    }

    pub fn upsert(&self, table: impl Into<String>) -> DatabaseUpsert {
        DatabaseUpsert::new(Arc::clone(&self.backend), table)
    }

    /// # Errors
    /// Returns the backend's error.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        self.backend.list_tables().await
    }

    /// Creates `name` with `columns` unless it already exists.
    ///
    /// # Errors
    /// Returns the backend's error.
    pub async fn create_table(&self, name: &str, columns: &[SqlColumn]) -> Result<()> {
        self.backend.create_table(name, columns).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::MemoryBackend;
    use serde_json::json;

    fn memory_database() -> (Arc<MemoryBackend>, Database) {
        let backend = Arc::new(MemoryBackend::default());
        (backend.clone(), Database::from_backend(backend))
    }

    #[tokio::test]
    async fn test_builders_do_nothing_until_executed() -> Result<()> {
        let (backend, database) = memory_database();
        let pending = database.insert("guilds").set("guild", "1");
        assert!(backend.rows("guilds").is_empty());
        pending.execute().await?;
        assert_eq!(backend.rows("guilds").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_overwrite_uses_last_predicate() -> Result<()> {
        let (_, database) = memory_database();
        database.insert("guilds").set("guild", "1").execute().await?;
        database.insert("guilds").set("guild", "2").execute().await?;

        let result = database
            .query("guilds")
            .where_eq("guild", "1")
            .where_eq("guild", "2")
            .execute()
            .await?;
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().get_string("guild").as_deref(), Some("2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_insert_satisfies_its_filter() -> Result<()> {
        let (_, database) = memory_database();
        database
            .upsert("guilds")
            .where_eq("guild", "9")
            .where_ignore_case("name", "Rustaceans")?
            .set("prefix", "!")
            .execute()
            .await?;
        let result = database
            .query("guilds")
            .where_eq("guild", "9")
            .where_ignore_case("name", "RUSTACEANS")?
            .execute()
            .await?;
        assert_eq!(result.len(), 1);
        assert_eq!(result.first().unwrap().get_object("prefix"), Some(&json!("!")));
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_without_values_on_existing_row_is_noop() -> Result<()> {
        let (backend, database) = memory_database();
        database.insert("guilds").set("guild", "1").set("prefix", "!").execute().await?;
        database.upsert("guilds").where_eq("guild", "1").execute().await?;
        let rows = backend.rows("guilds");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_string("prefix").as_deref(), Some("!"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_tables() -> Result<()> {
        let (_, database) = memory_database();
        database.create_table("guilds", &[SqlColumn::varchar("guild", 32)]).await?;
        assert_eq!(database.list_tables().await?, ["guilds"]);
        assert_eq!(database.backend().name(), "memory");
        Ok(())
    }
}
