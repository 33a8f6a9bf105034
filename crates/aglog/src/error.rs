//! Error types for the rolling file logger.

use thiserror::Error;

/// Errors that can occur in the logger.
#[derive(Debug, Error)]
pub enum LogError {
    /// An enumeration value, name, or format string was not valid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not allowed in the logger's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A setting carried a value that could not be parsed.
    #[error("invalid value for setting '{key}': {value:?}")]
    InvalidSetting {
        /// Prefix-stripped setting key.
        key: String,
        /// Raw value after environment expansion.
        value: String,
    },

    /// An I/O error occurred on the write path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for logger operations.
pub type Result<T> = std::result::Result<T, LogError>;
