//! Error types for studio-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Resolved path falls outside the workspace root
    #[error("path escapes workspace root: {0}")]
    PathEscape(String),

    /// No command tokens were given
    #[error("empty command")]
    EmptyCommand,

    /// Executable is not on the allowlist
    #[error("command not allowed: {0}")]
    CommandNotAllowed(String),

    /// The external assistant process could not be spawned
    #[error("assistant unavailable: {0}")]
    AdapterUnavailable(String),

    /// Path does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Target already exists
    #[error("already exists: {0}")]
    Conflict(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Content exceeds the configured size limit
    #[error("content too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// File is not UTF-8 text
    #[error("not a text file: {0}")]
    NotText(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
