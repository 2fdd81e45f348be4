//! Database configuration.
//!
//! The `[database]` table of `config.toml` selects the backend and its
//! connection URL. `DATABASE_BACKEND`, `DATABASE_URL` and `DATABASE_NAME`
//! override the file so deployments can keep credentials out of it.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::str::FromStr;

/// Default `SQLite` location, created on first connect.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/guildkit.sqlite?mode=rwc";

/// Which storage engine to connect to.
///
/// `config.toml` and `DATABASE_BACKEND` accept the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BackendKind {
    /// Any `SeaORM` URL: `sqlite:`, `postgres:` or `mysql:`
    #[default]
    Sql,
    MongoDb,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sql" | "sqlite" | "postgres" | "mysql" => Ok(Self::Sql),
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            other => Err(Error::Config {
                message: format!("Unknown database backend '{other}'"),
            }),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Connection settings for the configured backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: BackendKind,
    pub url: String,
    /// Database name; only used by MongoDB, where the URL does not select one
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sql,
            url: DEFAULT_DATABASE_URL.to_string(),
            name: "guildkit".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Applies `DATABASE_*` environment overrides.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `DATABASE_BACKEND` names an unknown backend.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `DATABASE_BACKEND` names an unknown backend.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("DATABASE_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.url = url;
        }
        if let Some(name) = lookup("DATABASE_NAME") {
            self.name = name;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_to_local_sqlite() {
        let config = DatabaseConfig::default();
        assert_eq!(config.backend, BackendKind::Sql);
        assert_eq!(config.url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_parse_backend_kind() {
        assert_eq!("MongoDB".parse::<BackendKind>().unwrap(), BackendKind::MongoDb);
        assert_eq!("sqlite".parse::<BackendKind>().unwrap(), BackendKind::Sql);
        assert!("redis".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_file_accepts_backend_aliases() {
        for (name, expected) in [
            ("sql", BackendKind::Sql),
            ("postgres", BackendKind::Sql),
            ("SQLite", BackendKind::Sql),
            ("mongo", BackendKind::MongoDb),
            ("mongodb", BackendKind::MongoDb),
        ] {
            let config: DatabaseConfig = toml::from_str(&format!("backend = \"{name}\"")).unwrap();
            assert_eq!(config.backend, expected, "{name}");
        }
        assert!(toml::from_str::<DatabaseConfig>("backend = \"redis\"").is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_BACKEND", "mongodb"),
            ("DATABASE_URL", "mongodb://localhost:27017"),
        ]
        .into_iter()
        .collect();
        let mut config = DatabaseConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.backend, BackendKind::MongoDb);
        assert_eq!(config.url, "mongodb://localhost:27017");
        assert_eq!(config.name, "guildkit");
    }

    #[test]
    fn test_invalid_backend_override_is_an_error() {
        let mut config = DatabaseConfig::default();
        let result = config.apply_overrides(|key| (key == "DATABASE_BACKEND").then(|| "nope".into()));
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
