//! Backend trait: the abstract interface for record persistence.
//!
//! This trait keeps the registry storage-agnostic. Implementations include
//! an in-memory arena (tests, ephemeral use) and SQLite.

use async_trait::async_trait;

use veilstore_core::{HandleId, Identity, Record, RecordId};

use crate::error::Result;

/// Async interface for record persistence.
///
/// Backends are dumb: they do not validate fields, check ownership or talk
/// to the gateway. They only guarantee the id invariants below.
///
/// # Design Notes
///
/// - **Dense ids**: records are inserted strictly in id order starting at
///   [`RecordId::FIRST`]; anything else is [`StoreError::OutOfOrder`].
/// - **No deletion**: there is no remove operation, so ids are never reused.
/// - **Narrow mutation**: only the rating handle and the visibility flag of
///   a stored record can change.
///
/// [`StoreError::OutOfOrder`]: crate::StoreError::OutOfOrder
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// The id the next insert must carry.
    async fn next_id(&self) -> Result<RecordId>;

    /// Insert a new record. `record.id` must equal [`next_id`](Self::next_id).
    async fn insert_record(&self, record: &Record) -> Result<()>;

    /// Get a record by id. Records with `exists == false` are never returned.
    async fn get_record(&self, id: RecordId) -> Result<Option<Record>>;

    /// Replace the rating handle of a stored record.
    async fn set_rating_handle(&self, id: RecordId, handle: HandleId) -> Result<()>;

    /// Overwrite the visibility flag of a stored record.
    async fn set_visible(&self, id: RecordId, visible: bool) -> Result<()>;

    /// Number of ids allocated so far.
    async fn count(&self) -> Result<u64>;

    /// Ids of all records owned by `owner`, ascending.
    async fn records_of(&self, owner: &Identity) -> Result<Vec<RecordId>>;
}
