//! Error types for catalogue parsing and unit extraction.

use thiserror::Error;

/// Errors that can occur while parsing sources or extracting a unit.
///
/// Every error is terminal for the query that produced it: extraction fails
/// fast rather than returning a partially resolved datasheet.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed markup at byte {position}: {message}")]
    MalformedMarkup { position: u64, message: String },

    #[error("unit '{name}' not found (catalogue contains: {})", .available.join(", "))]
    UnitNotFound { name: String, available: Vec<String> },

    #[error("unit name '{name}' is ambiguous, matches entries: {}", .ids.join(", "))]
    AmbiguousUnit { name: String, ids: Vec<String> },

    #[error("link target '{target}' not found in any loaded catalogue (reached via: {})", .chain.join(" -> "))]
    UnresolvedLink { target: String, chain: Vec<String> },

    #[error("cyclic link chain: {}", .chain.join(" -> "))]
    CyclicLink { chain: Vec<String> },

    #[error("profile references unknown schema '{0}'")]
    SchemaNotFound(String),

    #[error("profile '{profile}' does not match schema '{schema}': {detail}")]
    ProfileMismatch {
        profile: String,
        schema: String,
        detail: String,
    },

    #[error("entry nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
