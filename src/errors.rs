//! Unified error types for guildkit.
//!
//! Every backend failure is funneled into [`DatabaseError`], which keeps the
//! original driver error as its source. Everything else the crate can fail on
//! lives in [`Error`].

use thiserror::Error;

/// Errors raised while talking to a database backend.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The SQL driver (sea-orm / sqlx) reported an error.
    #[error("SQL backend error: {0}")]
    Sql(#[from] sea_orm::DbErr),

    /// A SQL statement could not be assembled from the builder state.
    #[error("Failed to build statement: {0}")]
    Statement(#[from] sea_orm::sea_query::error::Error),

    /// The MongoDB driver reported an error.
    #[error("MongoDB backend error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A value could not be converted to BSON.
    #[error("BSON conversion error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    /// A keyed lookup found no row.
    #[error("No entry in `{table}` where `{field}` = {key}")]
    NoSuchEntry {
        /// Table that was searched
        table: String,
        /// Key column
        field: String,
        /// Requested key
        key: String,
    },
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Document is read-only")]
    ReadOnly,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a keyed lookup miss rather than a real failure.
    #[must_use]
    pub const fn is_no_such_entry(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::NoSuchEntry { .. }))
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Database(DatabaseError::Sql(value))
    }
}

impl From<sea_orm::sea_query::error::Error> for Error {
    fn from(value: sea_orm::sea_query::error::Error) -> Self {
        Self::Database(DatabaseError::Statement(value))
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(value: mongodb::error::Error) -> Self {
        Self::Database(DatabaseError::Mongo(value))
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(value: mongodb::bson::ser::Error) -> Self {
        Self::Database(DatabaseError::Bson(value))
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
