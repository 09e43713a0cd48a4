//! Error types for MashaDB.

use thiserror::Error;

use crate::lexicon::TokenKind;

/// The main error type for MashaDB operations.
#[derive(Debug, Error)]
pub enum MashaError {
    /// A shorthand token looked like an expansion but could not be expanded.
    #[error("Malformed expansion for '{key}': '{token}' ({reason})")]
    MalformedExpansion {
        key: String,
        token: String,
        reason: &'static str,
    },

    /// No filters were given where a WHERE clause was required.
    #[error("Empty condition: nothing to combine into a WHERE clause")]
    EmptyCondition,

    /// A token carries the triggers of two rules the lexicon will not rank.
    #[error("Ambiguous token for '{key}': '{token}' matches both {first} and {second}")]
    AmbiguousToken {
        key: String,
        token: String,
        first: TokenKind,
        second: TokenKind,
    },

    /// The schema builder was handed a column declaration it cannot render.
    #[error("Unknown column declaration: {0}")]
    UnknownColumnDeclaration(String),

    /// Invalid value.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The table is not in the registry.
    #[error("Unknown table: '{0}'. Try refreshing the schema")]
    UnknownTable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MashaError {
    /// Create a malformed expansion error for `key`.
    pub fn malformed(key: &str, token: &str, reason: &'static str) -> Self {
        Self::MalformedExpansion {
            key: key.to_string(),
            token: token.to_string(),
            reason,
        }
    }

    /// Create an unknown column declaration error.
    pub fn column(message: impl Into<String>) -> Self {
        Self::UnknownColumnDeclaration(message.into())
    }
}

/// Result type alias for MashaDB operations.
pub type MashaResult<T> = Result<T, MashaError>;
