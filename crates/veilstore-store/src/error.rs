//! Error types for the store module.

use thiserror::Error;

use veilstore_core::RecordId;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No record under this id.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// Insert with an id other than the next one to allocate.
    #[error("out-of-order insert: expected {expected}, got {got}")]
    OutOfOrder { expected: RecordId, got: RecordId },

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Blocking task failed to run.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
