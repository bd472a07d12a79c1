//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Mutations on the inquiry store never surface these; they only come out of
/// storage backends and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend refused a write because it would exceed its quota.
    #[error("Storage quota exceeded for key {key}: limit is {limit} bytes")]
    QuotaExceeded {
        /// Key that was being written.
        key: String,
        /// Configured quota in bytes.
        limit: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
