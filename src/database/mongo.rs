//! MongoDB backend.
//!
//! Tables map to collections and rows to documents. A case-insensitive
//! predicate becomes an anchored `$regex` on its own field; the other
//! predicates of the filter keep comparing exactly.

use super::action::{DatabaseDeletion, DatabaseInsertion, DatabaseQuery, DatabaseUpdate, DatabaseUpsert, Order};
use super::backend::{Backend, upsert_by_query};
use super::column::SqlColumn;
use super::result::ExecutedQuery;
use super::where_clause::{Comparison, Filter, Where};
use crate::document::Document;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::options::{ClientOptions, FindOptions, UpdateOptions};
use mongodb::{Client, Collection, Database};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Runs builder actions against one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoBackend {
    database: Database,
}

impl MongoBackend {
    /// Connects to `url` and selects the database `name`.
    ///
    /// The server is pinged once so a bad URL fails here rather than on first use.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the server does not answer.
    pub async fn connect(url: &str, name: &str) -> Result<Self> {
        let options = ClientOptions::parse(url).await?;
        let client = Client::with_options(options)?;
        let database = client.database(name);
        database.run_command(doc! { "ping": 1 }, None).await?;
        info!(database = name, "Connected to MongoDB");
        Ok(Self { database })
    }

    #[must_use]
    pub const fn from_database(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }
}

/// # Errors
/// Returns [`Error::Database`] if a value cannot be represented in BSON.
pub fn to_bson(value: &Value) -> Result<Bson> {
    Ok(bson::to_bson(value)?)
}

/// Converts written values into a BSON document.
///
/// # Errors
/// Returns [`Error::Database`] if a value cannot be represented in BSON.
pub fn to_bson_document(values: &Map<String, Value>) -> Result<BsonDocument> {
    let mut document = BsonDocument::new();
    for (field, value) in values {
        document.insert(field.clone(), to_bson(value)?);
    }
    Ok(document)
}

/// Compiles a filter into a query document.
///
/// # Errors
/// Returns [`Error::Database`] if a value cannot be represented in BSON.
pub fn compile_filter(filter: &Filter) -> Result<BsonDocument> {
    let mut document = BsonDocument::new();
    for predicate in filter.iter() {
        match predicate.comparison() {
            Comparison::Equals => {
                document.insert(predicate.field(), to_bson(predicate.value())?);
            }
            Comparison::EqualsIgnoreCase => {
                document.insert(predicate.field(), ignore_case_pattern(predicate));
            }
            Comparison::NotEquals => {
                document.insert(predicate.field(), doc! { "$ne": to_bson(predicate.value())? });
            }
        }
    }
    Ok(document)
}

/// `{"$regex": "\A<escaped literal>\z", "$options": "i"}`
fn ignore_case_pattern(predicate: &Where) -> BsonDocument {
    let pattern = format!(r"\A{}\z", regex::escape(&predicate.text_value()));
    doc! { "$regex": pattern, "$options": "i" }
}

#[must_use]
pub fn find_options(query: &DatabaseQuery) -> FindOptions {
    let sort = query.ordering().map(|order_by| {
        let direction = match order_by.order {
            Order::Ascending => 1,
            Order::Descending => -1,
        };
        let mut sort = BsonDocument::new();
        sort.insert(order_by.field.clone(), direction);
        sort
    });
    let projection = (!query.selection().is_empty()).then(|| {
        query
            .selection()
            .iter()
            .map(|field| (field.clone(), Bson::Int32(1)))
            .collect::<BsonDocument>()
    });
    FindOptions::builder()
        .sort(sort)
        .limit(query.row_limit().map(|limit| i64::try_from(limit).unwrap_or(i64::MAX)))
        .projection(projection)
        .build()
}

fn from_bson_document(document: BsonDocument) -> Document {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Document::from_map(map),
        _ => Document::new(),
    }
}

/// Whether the server-side upsert inserts the same document as
/// [`DatabaseUpsert::to_insertion`].
///
/// The server copies only plain equality fields of the filter into the new
/// document and lets `$set` win over them, so a pattern predicate or a set
/// field named like a predicate needs the query-then-write path.
fn native_upsert_applies(upsert: &DatabaseUpsert) -> bool {
    !upsert.values().is_empty()
        && upsert.where_filter().iter().all(|predicate| {
            predicate.comparison() != Comparison::EqualsIgnoreCase
                && !upsert.values().contains_key(predicate.field())
        })
}

fn require_values(table: &str, values: &Map<String, Value>) -> Result<()> {
    if values.is_empty() {
        return Err(Error::invalid_argument(format!(
            "write to `{table}` sets no fields"
        )));
    }
    Ok(())
}

#[async_trait]
impl Backend for MongoBackend {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    #[instrument(skip_all, fields(collection = query.table()))]
    async fn query(&self, query: &DatabaseQuery) -> Result<ExecutedQuery> {
        if query.row_limit() == Some(0) {
            return Ok(ExecutedQuery::new(Vec::new()));
        }
        let filter = compile_filter(query.where_filter())?;
        debug!(%filter, "Executing find");
        let cursor = self
            .collection(query.table())
            .find(filter, find_options(query))
            .await?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(ExecutedQuery::new(
            documents.into_iter().map(from_bson_document).collect(),
        ))
    }

    #[instrument(skip_all, fields(collection = insertion.table()))]
    async fn insert(&self, insertion: &DatabaseInsertion) -> Result<()> {
        require_values(insertion.table(), insertion.values())?;
        let document = to_bson_document(insertion.values())?;
        self.collection(insertion.table())
            .insert_one(document, None)
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(collection = update.table()))]
    async fn update(&self, update: &DatabaseUpdate) -> Result<()> {
        require_values(update.table(), update.values())?;
        let filter = compile_filter(update.where_filter())?;
        let result = self
            .collection(update.table())
            .update_many(filter, doc! { "$set": to_bson_document(update.values())? }, None)
            .await?;
        debug!(matched = result.matched_count, "Updated documents");
        Ok(())
    }

    #[instrument(skip_all, fields(collection = deletion.table()))]
    async fn delete(&self, deletion: &DatabaseDeletion) -> Result<()> {
        let filter = compile_filter(deletion.where_filter())?;
        let result = self
            .collection(deletion.table())
            .delete_many(filter, None)
            .await?;
        debug!(deleted = result.deleted_count, "Deleted documents");
        Ok(())
    }

    /// Native upsert when the server would insert the same document as the
    /// query-then-write path, that path otherwise.
    #[instrument(skip_all, fields(collection = upsert.table()))]
    async fn upsert(&self, upsert: &DatabaseUpsert) -> Result<()> {
        if !native_upsert_applies(upsert) {
            return upsert_by_query(self, upsert).await;
        }
        let filter = compile_filter(upsert.where_filter())?;
        let options = UpdateOptions::builder().upsert(Some(true)).build();
        self.collection(upsert.table())
            .update_many(filter, doc! { "$set": to_bson_document(upsert.values())? }, options)
            .await?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.database.list_collection_names(None).await?)
    }

    #[instrument(skip(self, _columns))]
    async fn create_table(&self, name: &str, _columns: &[SqlColumn]) -> Result<()> {
        if self.list_tables().await?.iter().any(|existing| existing == name) {
            return Ok(());
        }
        self.database.create_collection(name, None).await?;
        info!(collection = name, "Created collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::database::{Database as Handle, SetAction, WhereAction};
    use crate::test_utils::MemoryBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_compile_filter() {
        let mut filter = Filter::new();
        filter.insert(Where::equals("guild", "1"));
        filter.insert(Where::not_equals("banned", true));
        filter.insert(Where::equals_ignore_case("name", "Rust").unwrap());
        let compiled = compile_filter(&filter).unwrap();
        assert_eq!(
            compiled,
            doc! {
                "banned": { "$ne": true },
                "guild": "1",
                "name": { "$regex": r"\ARust\z", "$options": "i" },
            }
        );
    }

    #[test]
    fn test_ignore_case_stays_on_its_field() {
        let mut filter = Filter::new();
        filter.insert(Where::equals("guild", "AbC"));
        filter.insert(Where::equals_ignore_case("name", "x").unwrap());
        let compiled = compile_filter(&filter).unwrap();
        assert_eq!(compiled.get_str("guild").unwrap(), "AbC");
        assert_eq!(compiled.get_document("name").unwrap().get_str("$options").unwrap(), "i");

        let database = Handle::from_backend(Arc::new(MemoryBackend::default()));
        let query = database
            .query("guilds")
            .where_eq("guild", "AbC")
            .where_ignore_case("name", "x")
            .unwrap();
        assert!(find_options(&query).collation.is_none());
    }

    #[test]
    fn test_ignore_case_pattern_escapes_literal() {
        let mut filter = Filter::new();
        filter.insert(Where::equals_ignore_case("prefix", "a.b*?").unwrap());
        let compiled = compile_filter(&filter).unwrap();
        let pattern = compiled.get_document("prefix").unwrap().get_str("$regex").unwrap();
        assert_eq!(pattern, r"\Aa\.b\*\?\z");
    }

    #[test]
    fn test_null_compiles_to_bson_null() {
        let mut filter = Filter::new();
        filter.insert(Where::equals("prefix", Value::Null));
        let compiled = compile_filter(&filter).unwrap();
        assert_eq!(compiled.get("prefix"), Some(&Bson::Null));
    }

    #[test]
    fn test_find_options_compose_sort_projection_and_limit() {
        let database = Handle::from_backend(Arc::new(MemoryBackend::default()));
        let query = database
            .query("guilds")
            .select(["guild", "prefix"])
            .order("members", Order::Ascending)
            .limit(5);
        let options = find_options(&query);
        assert_eq!(options.sort, Some(doc! { "members": 1 }));
        assert_eq!(options.projection, Some(doc! { "guild": 1, "prefix": 1 }));
        assert_eq!(options.limit, Some(5));

        let descending = find_options(&database.query("guilds").order("members", Order::Descending));
        assert_eq!(descending.sort, Some(doc! { "members": -1 }));
        assert!(descending.projection.is_none());
        assert!(descending.limit.is_none());
    }

    #[test]
    fn test_native_upsert_only_when_server_inserts_the_same_row() {
        let database = Handle::from_backend(Arc::new(MemoryBackend::default()));
        let plain = database.upsert("guilds").where_eq("guild", "1").set("prefix", "?");
        assert!(native_upsert_applies(&plain));

        let overlapping = database.upsert("guilds").where_eq("guild", "1").set("guild", "2");
        assert!(!native_upsert_applies(&overlapping));
        assert_eq!(overlapping.to_insertion().values().get("guild"), Some(&json!("1")));

        let ignore_case = database
            .upsert("guilds")
            .where_ignore_case("name", "Bob")
            .unwrap()
            .set("prefix", "?");
        assert!(!native_upsert_applies(&ignore_case));

        let nothing_set = database.upsert("guilds").where_eq("guild", "1");
        assert!(!native_upsert_applies(&nothing_set));
    }

    #[tokio::test]
    async fn test_zero_limit_returns_no_rows_without_a_round_trip() -> Result<()> {
        // Port 1 has no server; a find would fail after the selection timeout.
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1").await?;
        options.server_selection_timeout = Some(std::time::Duration::from_millis(50));
        let backend = MongoBackend::from_database(Client::with_options(options)?.database("guildkit"));
        let database = Handle::from_backend(Arc::new(backend));

        let result = database.query("guilds").limit(0).execute().await?;
        assert!(result.is_empty());
        Ok(())
    }

    #[test]
    fn test_to_bson_document() {
        let mut values = Map::new();
        values.insert("prefix".into(), json!("!"));
        values.insert("members".into(), json!(12));
        values.insert("roles".into(), json!(["a", "b"]));
        let document = to_bson_document(&values).unwrap();
        assert_eq!(document.get_str("prefix").unwrap(), "!");
        assert!(matches!(document.get("members"), Some(Bson::Int32(12) | Bson::Int64(12))));
        assert_eq!(document.get_array("roles").unwrap().len(), 2);
    }

    #[test]
    fn test_documents_convert_to_relaxed_json() {
        let document = from_bson_document(doc! { "guild": "1", "members": 3_i64, "nested": { "a": true } });
        assert_eq!(document.get_string("guild").as_deref(), Some("1"));
        assert_eq!(document.get_long("members"), Some(3));
        assert_eq!(document.get_document("nested").unwrap().get_bool("a"), Some(true));
    }
}
