//! Shared test utilities for guildkit.
//!
//! Provides an in-memory `SQLite` database for SQL tests and a
//! [`MemoryBackend`] that evaluates builder actions over plain documents,
//! counting queries so cache behavior can be asserted.

#![allow(clippy::unwrap_used)]

use crate::database::{
    Backend, Comparison, Database, DatabaseDeletion, DatabaseInsertion, DatabaseQuery,
    DatabaseUpdate, ExecutedQuery, Filter, Order, SqlBackend, SqlColumn,
};
use crate::document::Document;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates a [`Database`] over an in-memory `SQLite` connection.
pub(crate) async fn setup_sql_database() -> Result<Database> {
    let backend = SqlBackend::connect("sqlite::memory:").await?;
    Ok(Database::from_backend(Arc::new(backend)))
}

/// Backend keeping every table as a list of documents.
#[derive(Debug, Default)]
pub(crate) struct MemoryBackend {
    tables: Mutex<BTreeMap<String, Vec<Document>>>,
    queries: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryBackend {
    /// Number of `query` calls so far, including failed ones.
    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    /// Makes every following call fail with a backend error.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub(crate) fn rows(&self, table: &str) -> Vec<Document> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(sea_orm::DbErr::Custom("memory backend is failing".into()).into());
        }
        Ok(())
    }
}

fn matches(filter: &Filter, row: &Document) -> bool {
    filter.iter().all(|predicate| {
        let actual = row.get_object(predicate.field()).unwrap_or(&Value::Null);
        match predicate.comparison() {
            Comparison::Equals => actual == predicate.value(),
            Comparison::NotEquals => actual != predicate.value(),
            Comparison::EqualsIgnoreCase => row
                .get_string(predicate.field())
                .is_some_and(|text| text.to_lowercase() == predicate.text_value().to_lowercase()),
        }
    })
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(row: &Document, selection: &[String]) -> Document {
    if selection.is_empty() {
        return row.clone();
    }
    let mut projected = Document::new();
    for field in selection {
        if let Some(value) = row.get_object(field) {
            projected.set(field.clone(), value.clone()).unwrap();
        }
    }
    projected
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, query: &DatabaseQuery) -> Result<ExecutedQuery> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        self.check()?;
        let mut rows: Vec<Document> = self
            .rows(query.table())
            .into_iter()
            .filter(|row| matches(query.where_filter(), row))
            .collect();
        if let Some(order_by) = query.ordering() {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get_object(&order_by.field), b.get_object(&order_by.field));
                match order_by.order {
                    Order::Ascending => ordering,
                    Order::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.row_limit() {
            rows.truncate(usize::try_from(limit).unwrap());
        }
        Ok(ExecutedQuery::new(
            rows.iter().map(|row| project(row, query.selection())).collect(),
        ))
    }

    async fn insert(&self, insertion: &DatabaseInsertion) -> Result<()> {
        self.check()?;
        if insertion.values().is_empty() {
            return Err(Error::invalid_argument("insert sets no columns"));
        }
        self.tables
            .lock()
            .entry(insertion.table().to_string())
            .or_default()
            .push(Document::from_map(insertion.values().clone()));
        Ok(())
    }

    async fn update(&self, update: &DatabaseUpdate) -> Result<()> {
        self.check()?;
        if update.values().is_empty() {
            return Err(Error::invalid_argument("update sets no columns"));
        }
        let mut tables = self.tables.lock();
        for row in tables.entry(update.table().to_string()).or_default() {
            if matches(update.where_filter(), row) {
                for (field, value) in update.values() {
                    row.set(field.clone(), value.clone())?;
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, deletion: &DatabaseDeletion) -> Result<()> {
        self.check()?;
        if let Some(rows) = self.tables.lock().get_mut(deletion.table()) {
            rows.retain(|row| !matches(deletion.where_filter(), row));
        }
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        self.check()?;
        Ok(self.tables.lock().keys().cloned().collect())
    }

    async fn create_table(&self, name: &str, _columns: &[SqlColumn]) -> Result<()> {
        self.check()?;
        self.tables.lock().entry(name.to_string()).or_default();
        Ok(())
    }
}
