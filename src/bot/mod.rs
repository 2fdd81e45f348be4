//! Bot layer - Discord interface, prefix resolution and command handlers
//!
//! This module wires the database layer into a poise framework: guild
//! prefixes are read through a cached key/value access and every command
//! receives the shared [`BotData`].

/// Discord command implementations (general, prefix)
pub mod commands;
/// Framework setup and the client loop
pub mod framework;
/// Guild prefix resolution
pub mod prefix;

pub use framework::run_bot;
pub use prefix::PrefixProvider;

use crate::database::Database;

/// Shared data available to all bot commands.
#[derive(Debug)]
pub struct BotData {
    /// Database handle for all database operations
    pub database: Database,
    /// Prefix lookup for prefix commands
    pub prefixes: PrefixProvider,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(database: Database, prefixes: PrefixProvider) -> Self {
        Self { database, prefixes }
    }
}
