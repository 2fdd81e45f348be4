//! SQL backend built on `SeaORM`.
//!
//! Builders are compiled into `sea_query` statements and run through a
//! [`DatabaseConnection`], so the same code serves `SQLite`, `PostgreSQL` and
//! `MySQL`. Rows come back as JSON objects via `FromQueryResult for JsonValue`.

use super::action::{DatabaseDeletion, DatabaseInsertion, DatabaseQuery, DatabaseUpdate, Order};
use super::backend::Backend;
use super::column::{ColumnType, SqlColumn};
use super::result::ExecutedQuery;
use super::where_clause::{Comparison, Filter, Where};
use crate::document::Document;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{
    Alias, Asterisk, ColumnDef, Cond, DeleteStatement, Expr, Func, InsertStatement, Order as SqlOrder,
    Query, SelectStatement, SimpleExpr, Table, TableCreateStatement, UpdateStatement, Value as SqlValue,
};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, FromQueryResult, JsonValue, Statement,
};
use tracing::{debug, info, instrument};

/// Runs builder actions against a relational database.
#[derive(Debug, Clone)]
pub struct SqlBackend {
    connection: DatabaseConnection,
}

impl SqlBackend {
    /// Connects to `url`, e.g. `sqlite://data/guildkit.sqlite?mode=rwc` or `postgres://...`.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let connection = Database::connect(url).await?;
        info!(backend = ?connection.get_database_backend(), "Connected to SQL database");
        Ok(Self { connection })
    }

    #[must_use]
    pub const fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    fn dialect(&self) -> DbBackend {
        self.connection.get_database_backend()
    }

    async fn run<S>(&self, statement: &S) -> Result<()>
    where
        S: sea_orm::StatementBuilder + Sync,
    {
        let statement = self.dialect().build(statement);
        debug!(sql = %statement, "Executing statement");
        self.connection.execute(statement).await?;
        Ok(())
    }
}

/// Converts a JSON literal into a bound SQL value.
///
/// Arrays and objects are stored as their JSON text. `null` binds as a typed
/// NULL string, which every supported dialect accepts for any column.
#[must_use]
pub fn to_sql_value(value: &JsonValue) -> SqlValue {
    match value {
        JsonValue::Null => SqlValue::String(None),
        JsonValue::Bool(b) => (*b).into(),
        JsonValue::Number(n) => n
            .as_i64()
            .map(SqlValue::from)
            .or_else(|| n.as_u64().map(SqlValue::from))
            .or_else(|| n.as_f64().map(SqlValue::from))
            .unwrap_or(SqlValue::String(None)),
        JsonValue::String(s) => s.as_str().into(),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => nested.to_string().into(),
    }
}

/// Compiles one predicate. Comparisons with `null` become `IS [NOT] NULL`.
///
/// Ignore-case lowers both sides in the database, so a stored value always
/// matches itself whatever the dialect's `LOWER` folds.
#[must_use]
pub fn compile_where(predicate: &Where) -> SimpleExpr {
    let column = Expr::col(Alias::new(predicate.field()));
    match (predicate.comparison(), predicate.value()) {
        (Comparison::Equals, JsonValue::Null) => column.is_null(),
        (Comparison::NotEquals, JsonValue::Null) => column.is_not_null(),
        (Comparison::Equals, value) => column.eq(to_sql_value(value)),
        (Comparison::NotEquals, value) => column.ne(to_sql_value(value)),
        (Comparison::EqualsIgnoreCase, _) => Expr::expr(Func::lower(column))
            .eq(Func::lower(Expr::val(predicate.text_value()))),
    }
}

/// ANDs all predicates together, or `None` for an empty filter.
#[must_use]
pub fn compile_filter(filter: &Filter) -> Option<Cond> {
    if filter.is_empty() {
        return None;
    }
    Some(
        filter
            .iter()
            .fold(Cond::all(), |condition, predicate| condition.add(compile_where(predicate))),
    )
}

#[must_use]
pub fn build_select(query: &DatabaseQuery) -> SelectStatement {
    let mut statement = Query::select();
    statement.from(Alias::new(query.table()));
    if query.selection().is_empty() {
        statement.column(Asterisk);
    } else {
        statement.columns(query.selection().iter().map(|field| Alias::new(field.as_str())));
    }
    if let Some(condition) = compile_filter(query.where_filter()) {
        statement.cond_where(condition);
    }
    if let Some(order_by) = query.ordering() {
        let order = match order_by.order {
            Order::Ascending => SqlOrder::Asc,
            Order::Descending => SqlOrder::Desc,
        };
        statement.order_by(Alias::new(order_by.field.as_str()), order);
    }
    if let Some(limit) = query.row_limit() {
        statement.limit(limit);
    }
    statement
}

/// # Errors
/// Returns [`Error::InvalidArgument`] when no column was set.
pub fn build_insert(insertion: &DatabaseInsertion) -> Result<InsertStatement> {
    if insertion.values().is_empty() {
        return Err(Error::invalid_argument(format!(
            "insert into `{}` sets no columns",
            insertion.table()
        )));
    }
    let mut statement = Query::insert();
    statement
        .into_table(Alias::new(insertion.table()))
        .columns(insertion.values().keys().map(|field| Alias::new(field.as_str())));
    statement.values(
        insertion
            .values()
            .values()
            .map(|value| SimpleExpr::from(to_sql_value(value))),
    )?;
    Ok(statement)
}

/// # Errors
/// Returns [`Error::InvalidArgument`] when no column was set.
pub fn build_update(update: &DatabaseUpdate) -> Result<UpdateStatement> {
    if update.values().is_empty() {
        return Err(Error::invalid_argument(format!(
            "update of `{}` sets no columns",
            update.table()
        )));
    }
    let mut statement = Query::update();
    statement.table(Alias::new(update.table())).values(
        update
            .values()
            .iter()
            .map(|(field, value)| (Alias::new(field.as_str()), SimpleExpr::from(to_sql_value(value)))),
    );
    if let Some(condition) = compile_filter(update.where_filter()) {
        statement.cond_where(condition);
    }
    Ok(statement)
}

#[must_use]
pub fn build_delete(deletion: &DatabaseDeletion) -> DeleteStatement {
    let mut statement = Query::delete();
    statement.from_table(Alias::new(deletion.table()));
    if let Some(condition) = compile_filter(deletion.where_filter()) {
        statement.cond_where(condition);
    }
    statement
}

/// # Errors
/// Returns [`Error::InvalidArgument`] for an empty column list.
pub fn build_create_table(name: &str, columns: &[SqlColumn]) -> Result<TableCreateStatement> {
    if columns.is_empty() {
        return Err(Error::invalid_argument(format!(
            "table `{name}` needs at least one column"
        )));
    }
    let mut statement = Table::create();
    statement.table(Alias::new(name)).if_not_exists();
    for column in columns {
        let mut definition = ColumnDef::new(Alias::new(column.name.as_str()));
        match column.kind {
            ColumnType::Varchar(length) => definition.string_len(length),
            ColumnType::Text => definition.text(),
            ColumnType::Integer => definition.integer(),
            ColumnType::BigInteger => definition.big_integer(),
            ColumnType::Double => definition.double(),
            ColumnType::Boolean => definition.boolean(),
        };
        if !column.nullable {
            definition.not_null();
        }
        statement.col(&mut definition);
    }
    Ok(statement)
}

const fn list_tables_sql(dialect: DbBackend) -> &'static str {
    match dialect {
        DbBackend::Sqlite => {
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
        }
        DbBackend::Postgres => {
            "SELECT tablename::text FROM pg_catalog.pg_tables WHERE schemaname = current_schema() ORDER BY tablename"
        }
        DbBackend::MySql => {
            "SELECT CAST(table_name AS CHAR) FROM information_schema.tables WHERE table_schema = DATABASE() ORDER BY table_name"
        }
    }
}

#[async_trait]
impl Backend for SqlBackend {
    fn name(&self) -> &'static str {
        "sql"
    }

    #[instrument(skip_all, fields(table = query.table()))]
    async fn query(&self, query: &DatabaseQuery) -> Result<ExecutedQuery> {
        let statement = self.dialect().build(&build_select(query));
        debug!(sql = %statement, "Executing query");
        let rows = JsonValue::find_by_statement(statement)
            .all(&self.connection)
            .await?;
        Ok(ExecutedQuery::new(
            rows.into_iter()
                .filter_map(|row| Document::from_value(row).ok())
                .collect(),
        ))
    }

    #[instrument(skip_all, fields(table = insertion.table()))]
    async fn insert(&self, insertion: &DatabaseInsertion) -> Result<()> {
        self.run(&build_insert(insertion)?).await
    }

    #[instrument(skip_all, fields(table = update.table()))]
    async fn update(&self, update: &DatabaseUpdate) -> Result<()> {
        self.run(&build_update(update)?).await
    }

    #[instrument(skip_all, fields(table = deletion.table()))]
    async fn delete(&self, deletion: &DatabaseDeletion) -> Result<()> {
        self.run(&build_delete(deletion)).await
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let dialect = self.dialect();
        let rows = self
            .connection
            .query_all(Statement::from_string(dialect, list_tables_sql(dialect)))
            .await?;
        rows.iter()
            .map(|row| row.try_get_by_index::<String>(0).map_err(Into::into))
            .collect()
    }

    #[instrument(skip(self, columns))]
    async fn create_table(&self, name: &str, columns: &[SqlColumn]) -> Result<()> {
        self.run(&build_create_table(name, columns)?).await?;
        info!(table = name, "Ensured table exists");
        Ok(())
    }
}
