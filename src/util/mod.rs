//! Small framework-independent helpers.

/// String formatting and parsing helpers
pub mod strings;
/// Semantic-ish version numbers
pub mod version;

pub use version::Version;
