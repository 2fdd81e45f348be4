//! Bot configuration: the default prefix and where per-guild prefixes are stored.

use crate::database::{DatabaseAccessConfig, SqlColumn};
use serde::Deserialize;

/// Longest prefix a guild may configure.
pub const MAX_PREFIX_LENGTH: usize = 100;

/// The `[bot]` table of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix used in direct messages and guilds without their own
    pub default_prefix: String,
    /// Table holding one row per guild
    pub guild_table: String,
    pub guild_key_column: String,
    pub prefix_column: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_prefix: "!".to_string(),
            guild_table: "guilds".to_string(),
            guild_key_column: "guild_id".to_string(),
            prefix_column: "prefix".to_string(),
        }
    }
}

impl BotConfig {
    /// Access configuration for the prefix column of the guild table.
    #[must_use]
    pub fn prefix_access(&self) -> DatabaseAccessConfig {
        DatabaseAccessConfig::new(
            self.guild_table.as_str(),
            self.guild_key_column.as_str(),
            self.prefix_column.as_str(),
        )
    }

    /// Column definitions used to create the guild table.
    #[must_use]
    pub fn guild_table_columns(&self) -> Vec<SqlColumn> {
        let prefix_length = u32::try_from(MAX_PREFIX_LENGTH).unwrap_or(u32::MAX);
        vec![
            SqlColumn::varchar(self.guild_key_column.as_str(), 32).not_null(),
            SqlColumn::varchar(self.prefix_column.as_str(), prefix_length),
        ]
    }
}
