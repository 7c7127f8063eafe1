//! Error types for the Registry.

use thiserror::Error;

use veilstore_core::{HandleId, Identity, RecordId, ValidationError};
use veilstore_gateway::GatewayError;
use veilstore_store::StoreError;

/// Errors that can occur during Registry operations.
///
/// Callers see three kinds: validation, authorization and not-found. The
/// `Gateway` and `Store` variants carry infrastructure failures that fit
/// none of them.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Rejected input. Nothing was mutated.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Caller does not own the record. Nothing was mutated.
    #[error("not authorized: {caller}")]
    Unauthorized { caller: Identity },

    /// Id outside the assigned range, or no such record.
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// The gateway has no entry for a handle the registry holds.
    #[error("handle not found in gateway: {0}")]
    HandleNotFound(HandleId),

    /// Cross-record comparison is not available.
    #[error("encrypted comparison is not supported")]
    ComparisonUnavailable,

    /// Gateway failure.
    #[error("gateway error: {0}")]
    Gateway(GatewayError),

    /// Storage failure.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl RegistryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RegistryError::Validation(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RegistryError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::RecordNotFound(_) | RegistryError::HandleNotFound(_)
        )
    }
}

impl From<GatewayError> for RegistryError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Range(v) => RegistryError::Validation(v),
            GatewayError::HandleNotFound(handle) => RegistryError::HandleNotFound(handle),
            GatewayError::Unauthorized { requester, .. } => {
                RegistryError::Unauthorized { caller: requester }
            }
            other => RegistryError::Gateway(other),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RecordNotFound(id) => RegistryError::RecordNotFound(id),
            other => RegistryError::Store(other),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
