//! Per-guild command prefixes.

use crate::config::BotConfig;
use crate::config::bot::MAX_PREFIX_LENGTH;
use crate::database::{CacheConfig, CachedDatabaseAccess, Database, DatabaseAccess};
use crate::errors::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Resolves the prefix a message must start with.
///
/// Guild prefixes live in the configured guild table; guilds without a row
/// and direct messages use the default prefix.
#[derive(Clone)]
pub struct PrefixProvider {
    default_prefix: String,
    access: Arc<dyn DatabaseAccess<String>>,
}

impl PrefixProvider {
    pub fn new(default_prefix: impl Into<String>, access: Arc<dyn DatabaseAccess<String>>) -> Self {
        Self {
            default_prefix: default_prefix.into(),
            access,
        }
    }

    /// A provider caching guild prefixes in memory.
    #[must_use]
    pub fn cached(database: Database, config: &BotConfig, cache: &CacheConfig) -> Self {
        let access = CachedDatabaseAccess::for_string(database, config.prefix_access(), cache);
        Self::new(config.default_prefix.as_str(), Arc::new(access))
    }

    #[must_use]
    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Prefix used in direct messages.
    #[must_use]
    pub fn private_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// The guild's prefix, or the default when none is stored or the lookup fails.
    pub async fn guild_prefix(&self, guild_id: u64) -> String {
        self.access
            .get_value_or(&guild_id.to_string(), self.default_prefix.clone())
            .await
    }

    /// Validates and stores a new prefix for the guild, returning the stored value.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for a prefix outside 1 to 100
    /// characters, or the database error.
    pub async fn set_guild_prefix(&self, guild_id: u64, prefix: &str) -> Result<String> {
        let prefix = validate_prefix(prefix)?;
        self.access
            .set_value(&guild_id.to_string(), prefix.to_string())
            .await?;
        Ok(prefix.to_string())
    }
}

impl fmt::Debug for PrefixProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixProvider")
            .field("default_prefix", &self.default_prefix)
            .finish_non_exhaustive()
    }
}

/// Trims `prefix` and checks its length.
///
/// # Errors
/// Returns [`Error::InvalidArgument`] if the trimmed prefix is empty or longer
/// than [`MAX_PREFIX_LENGTH`] characters.
pub fn validate_prefix(prefix: &str) -> Result<&str> {
    let prefix = prefix.trim();
    let length = prefix.chars().count();
    if length == 0 || length > MAX_PREFIX_LENGTH {
        return Err(Error::invalid_argument(format!(
            "The prefix must be between 1 and {MAX_PREFIX_LENGTH} characters long"
        )));
    }
    Ok(prefix)
}
