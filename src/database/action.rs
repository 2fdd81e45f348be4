//! Fluent builders for the five database actions.
//!
//! Builders are created from a [`Database`](super::Database) handle, gather
//! predicates and values, and are consumed by `execute`. Nothing touches the
//! backend before `execute` is awaited.

use super::backend::Backend;
use super::result::ExecutedQuery;
use super::where_clause::{Filter, Where};
use crate::errors::Result;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Sort direction for [`DatabaseQuery::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Ascending,
    Descending,
}

/// A column plus its sort direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub order: Order,
}

/// Builders that accept where predicates.
///
/// Every method replaces any earlier predicate on the same column.
pub trait WhereAction: Sized {
    fn filter_mut(&mut self) -> &mut Filter;

    /// Keeps rows where `field` equals `value`.
    #[must_use]
    fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_mut().insert(Where::equals(field, value));
        self
    }

    /// Keeps rows where `field` does not equal `value`.
    #[must_use]
    fn where_not(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter_mut().insert(Where::not_equals(field, value));
        self
    }

    /// Keeps rows where `field` equals `value` ignoring case.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::errors::Error::InvalidArgument) for a `null` value.
    fn where_ignore_case(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self> {
        self.filter_mut()
            .insert(Where::equals_ignore_case(field, value)?);
        Ok(self)
    }

    /// Adds an already constructed predicate.
    #[must_use]
    fn filter(mut self, predicate: Where) -> Self {
        self.filter_mut().insert(predicate);
        self
    }
}

/// Builders that write column values.
pub trait SetAction: Sized {
    fn values_mut(&mut self) -> &mut Map<String, Value>;

    /// Sets `field` to `value`, replacing an earlier value for the same column.
    #[must_use]
    fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values_mut().insert(field.into(), value.into());
        self
    }
}

macro_rules! impl_where_action {
    ($($builder:ty),+) => {
        $(impl WhereAction for $builder {
            fn filter_mut(&mut self) -> &mut Filter {
                &mut self.filter
            }
        })+
    };
}

macro_rules! impl_set_action {
    ($($builder:ty),+) => {
        $(impl SetAction for $builder {
            fn values_mut(&mut self) -> &mut Map<String, Value> {
                &mut self.values
            }
        })+
    };
}

/// A select on one table.
#[derive(Debug)]
#[must_use = "a query does nothing until executed"]
pub struct DatabaseQuery {
    backend: Arc<dyn Backend>,
    table: String,
    filter: Filter,
    selection: Vec<String>,
    order: Option<OrderBy>,
    limit: Option<u64>,
}

impl DatabaseQuery {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            filter: Filter::new(),
            selection: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Restricts the returned columns. An empty selection returns every column.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn order(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            order,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn where_filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    #[must_use]
    pub const fn ordering(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    #[must_use]
    pub const fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Runs the query.
    ///
    /// # Errors
    /// Returns the backend's error if the query fails.
    pub async fn execute(self) -> Result<ExecutedQuery> {
        let backend = Arc::clone(&self.backend);
        backend.query(&self).await
    }
}

/// An insert of a single row.
#[derive(Debug)]
#[must_use = "an insertion does nothing until executed"]
pub struct DatabaseInsertion {
    backend: Arc<dyn Backend>,
    table: String,
    values: Map<String, Value>,
}

impl DatabaseInsertion {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            values: Map::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Inserts the row.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::errors::Error::InvalidArgument) when no
    /// column was set, or the backend's error.
    pub async fn execute(self) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        backend.insert(&self).await
    }
}

/// An update of every row matching the filter.
#[derive(Debug)]
#[must_use = "an update does nothing until executed"]
pub struct DatabaseUpdate {
    backend: Arc<dyn Backend>,
    table: String,
    filter: Filter,
    values: Map<String, Value>,
}

impl DatabaseUpdate {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            filter: Filter::new(),
            values: Map::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn where_filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Applies the update. With no predicates every row is updated.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`](crate::errors::Error::InvalidArgument) when no
    /// column was set, or the backend's error.
    pub async fn execute(self) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        backend.update(&self).await
    }
}

/// A delete of every row matching the filter.
#[derive(Debug)]
#[must_use = "a deletion does nothing until executed"]
pub struct DatabaseDeletion {
    backend: Arc<dyn Backend>,
    table: String,
    filter: Filter,
}

impl DatabaseDeletion {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            filter: Filter::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn where_filter(&self) -> &Filter {
        &self.filter
    }

    /// Deletes the matching rows. With no predicates the table is emptied.
    ///
    /// # Errors
    /// Returns the backend's error if the delete fails.
    pub async fn execute(self) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        backend.delete(&self).await
    }
}

/// Updates the matching rows, or inserts one when none match.
///
/// The inserted row holds the set columns plus the literal of every equality
/// predicate, so `where_eq("id", 5).set("v", 1)` inserts `{id: 5, v: 1}`.
/// A predicate literal replaces a set value for the same column.
#[derive(Debug)]
#[must_use = "an upsert does nothing until executed"]
pub struct DatabaseUpsert {
    backend: Arc<dyn Backend>,
    table: String,
    filter: Filter,
    values: Map<String, Value>,
}

impl DatabaseUpsert {
    pub(crate) fn new(backend: Arc<dyn Backend>, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            filter: Filter::new(),
            values: Map::new(),
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub const fn where_filter(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// The query that decides between the update and the insert branch.
    pub fn to_query(&self) -> DatabaseQuery {
        let mut query = DatabaseQuery::new(Arc::clone(&self.backend), self.table.clone());
        query.filter = self.filter.clone();
        query.limit(1)
    }

    /// The update run when a row matches.
    pub fn to_update(&self) -> DatabaseUpdate {
        DatabaseUpdate {
            backend: Arc::clone(&self.backend),
            table: self.table.clone(),
            filter: self.filter.clone(),
            values: self.values.clone(),
        }
    }

    /// The insert run when nothing matches.
    pub fn to_insertion(&self) -> DatabaseInsertion {
        let mut values = self.values.clone();
        for (field, literal) in self.filter.literals() {
            values.insert(field.to_string(), literal.clone());
        }
        DatabaseInsertion {
            backend: Arc::clone(&self.backend),
            table: self.table.clone(),
            values,
        }
    }

    /// Runs the upsert.
    ///
    /// # Errors
    /// Returns the backend's error from whichever step fails.
    pub async fn execute(self) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        backend.upsert(&self).await
    }
}

impl_where_action!(DatabaseQuery, DatabaseUpdate, DatabaseDeletion, DatabaseUpsert);
impl_set_action!(DatabaseInsertion, DatabaseUpdate, DatabaseUpsert);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::MemoryBackend;
    use serde_json::json;

    fn backend() -> Arc<dyn Backend> {
        Arc::new(MemoryBackend::default())
    }

    #[test]
    fn test_query_builder_state() {
        let query = DatabaseQuery::new(backend(), "guilds")
            .where_eq("guild", "1")
            .where_not("banned", true)
            .select(["prefix"])
            .order("prefix", Order::Descending)
            .limit(3);
        assert_eq!(query.table(), "guilds");
        assert_eq!(query.where_filter().len(), 2);
        assert_eq!(query.selection(), ["prefix".to_string()]);
        assert_eq!(
            query.ordering(),
            Some(&OrderBy {
                field: "prefix".into(),
                order: Order::Descending
            })
        );
        assert_eq!(query.row_limit(), Some(3));
    }

    #[test]
    fn test_where_ignore_case_null_is_rejected() {
        let result = DatabaseQuery::new(backend(), "guilds").where_ignore_case("name", Value::Null);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_last_write_wins() {
        let insertion = DatabaseInsertion::new(backend(), "guilds")
            .set("prefix", "!")
            .set("prefix", "?");
        assert_eq!(insertion.values().get("prefix"), Some(&json!("?")));
        assert_eq!(insertion.values().len(), 1);
    }

    #[test]
    fn test_upsert_insertion_merges_literals() {
        let upsert = DatabaseUpsert::new(backend(), "guilds")
            .where_eq("guild", "1")
            .where_ignore_case("name", "Rust")
            .unwrap()
            .where_not("banned", true)
            .set("prefix", "?")
            .set("guild", "ignored");
        let insertion = upsert.to_insertion();
        assert_eq!(insertion.values().get("guild"), Some(&json!("1")));
        assert_eq!(insertion.values().get("name"), Some(&json!("Rust")));
        assert_eq!(insertion.values().get("prefix"), Some(&json!("?")));
        assert!(!insertion.values().contains_key("banned"));

        let update = upsert.to_update();
        assert_eq!(update.where_filter(), upsert.where_filter());
        assert_eq!(update.values().get("guild"), Some(&json!("ignored")));

        let query = upsert.to_query();
        assert_eq!(query.row_limit(), Some(1));
        assert_eq!(query.where_filter().len(), 3);
    }
}
