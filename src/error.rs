//! Error types for bitmerkle

use thiserror::Error;

/// Result type alias for bitmerkle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bitmerkle operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Key of {len} bytes is too short: branching needs byte index {byte_index}")]
    InvalidKeyLength { byte_index: usize, len: usize },

    #[error("Key length mismatch: expected {expected} bytes, found {actual}")]
    KeyLengthMismatch { expected: usize, actual: usize },

    #[error("Keys must not be empty")]
    EmptyKey,

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
