//! Common error types for KinVault.

use thiserror::Error;

/// Top-level error type for vault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller role does not allow the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request is missing a title, value or file, or is otherwise malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Item lookup miss.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored ciphertext could not be reversed.
    #[error("Decryption failure: {0}")]
    Decryption(String),

    /// Object storage upload, signing or removal failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record store rejected a read, write or delete.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
