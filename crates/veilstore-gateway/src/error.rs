//! Error types for the encryption gateway.

use thiserror::Error;

use veilstore_core::{HandleId, Identity, ValidationError};

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Plaintext outside the declared bound.
    #[error("range error: {0}")]
    Range(#[from] ValidationError),

    /// No sealed value under this handle.
    #[error("handle not found: {0}")]
    HandleNotFound(HandleId),

    /// Requester holds no capability on the handle.
    #[error("identity {requester} holds no capability on handle {handle}")]
    Unauthorized {
        handle: HandleId,
        requester: Identity,
    },

    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Decryption error.
    #[error("decryption error: {0}")]
    DecryptionError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// No async runtime to schedule the unseal on.
    #[error("scheduler unavailable: {0}")]
    Scheduler(String),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
