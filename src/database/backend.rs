use super::action::{DatabaseDeletion, DatabaseInsertion, DatabaseQuery, DatabaseUpdate, DatabaseUpsert};
use super::column::SqlColumn;
use super::result::ExecutedQuery;
use crate::errors::Result;
use async_trait::async_trait;
use std::fmt;
use tracing::debug;

/// A storage engine that executes the builder actions.
///
/// Implementations translate each builder into their native statement form.
/// Builders only ever reach a backend through a shared `Arc<dyn Backend>`, so
/// implementations must be usable concurrently.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs, e.g. `sql`.
    fn name(&self) -> &'static str;

    async fn query(&self, query: &DatabaseQuery) -> Result<ExecutedQuery>;

    async fn insert(&self, insertion: &DatabaseInsertion) -> Result<()>;

    async fn update(&self, update: &DatabaseUpdate) -> Result<()>;

    async fn delete(&self, deletion: &DatabaseDeletion) -> Result<()>;

    /// Update-or-insert.
    ///
    /// The provided implementation is [`upsert_by_query`]. Backends with a
    /// native upsert should override this.
    async fn upsert(&self, upsert: &DatabaseUpsert) -> Result<()> {
        upsert_by_query(self, upsert).await
    }

    /// Names of all tables (or collections).
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Creates `name` if it does not exist yet.
    async fn create_table(&self, name: &str, columns: &[SqlColumn]) -> Result<()>;
}

/// Queries for a match, then updates it or inserts
/// [`DatabaseUpsert::to_insertion`].
///
/// The two steps are not atomic: a concurrent writer can insert a matching
/// row between them.
///
/// # Errors
/// Returns the backend's error from the query or the write.
pub async fn upsert_by_query<B>(backend: &B, upsert: &DatabaseUpsert) -> Result<()>
where
    B: Backend + ?Sized,
{
    if backend.query(&upsert.to_query()).await?.is_set() {
        if upsert.values().is_empty() {
            debug!(table = upsert.table(), "Upsert matched a row and has nothing to set");
            return Ok(());
        }
        backend.update(&upsert.to_update()).await
    } else {
        backend.insert(&upsert.to_insertion()).await
    }
}

impl fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").field("name", &self.name()).finish()
    }
}
