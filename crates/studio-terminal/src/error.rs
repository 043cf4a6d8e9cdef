//! Error types for studio-terminal

use thiserror::Error;

/// Terminal error type
#[derive(Debug, Error)]
pub enum Error {
    /// Pseudo-terminal could not be allocated on this host
    #[error("pseudo-terminal unavailable: {0}")]
    PtyUnavailable(String),

    /// Shell process could not be spawned
    #[error("failed to spawn '{program}': {reason}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying failure
        reason: String,
    },

    /// Read or write against a process that has exited
    #[error("process gone: {0}")]
    ProcessGone(String),

    /// Terminal dimensions could not be applied
    #[error("terminal resize failed: {0}")]
    TerminalResizeFailed(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
