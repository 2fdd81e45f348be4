//! Application configuration loaded from `config.toml` and the environment.
//!
//! Every table is optional; a missing file yields the defaults, which run the
//! bot against a local `SQLite` database.

/// Bot prefix and guild table settings
pub mod bot;
/// Database backend selection and connection settings
pub mod database;

pub use self::bot::BotConfig;
pub use self::database::{BackendKind, DatabaseConfig};
pub use crate::database::CacheConfig;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "GUILDKIT_CONFIG";

/// The whole `config.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub bot: BotConfig,
    pub cache: CacheConfig,
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the TOML is invalid.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// The config file path: `$GUILDKIT_CONFIG` or `./config.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_VAR).map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from)
}

/// Loads the application configuration.
///
/// Reads the file at [`config_path`] if it exists, then applies the
/// `DATABASE_*` environment overrides.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed, or an override is invalid.
pub fn load_app_config() -> Result<AppConfig> {
    let path = config_path();
    let mut config = if path.exists() {
        info!(path = %path.display(), "Loading configuration");
        load_config(&path)?
    } else {
        debug!(path = %path.display(), "No config file, using defaults");
        AppConfig::default()
    };
    config.database.apply_env_overrides()?;
    Ok(config)
}
