//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

use super::BotData;
use crate::errors::Error;

/// General utility commands
pub mod general;

/// Guild prefix commands
pub mod prefix;

// Export commands
pub use general::*;
pub use prefix::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![ping(), help(), version(), prefix(), setprefix()]
}
