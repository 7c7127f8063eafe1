//! In-memory implementation of the RecordBackend trait.
//!
//! Records live in a dense arena indexed by `id - 1`. Same semantics as the
//! SQLite backend, no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use veilstore_core::{HandleId, Identity, Record, RecordId};

use crate::error::{Result, StoreError};
use crate::traits::RecordBackend;

/// In-memory record arena.
///
/// All data is lost when the backend is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<MemoryBackendInner>,
}

#[derive(Default)]
struct MemoryBackendInner {
    /// Arena: slot `i` holds record id `i + 1`.
    records: Vec<Record>,

    /// Owner index.
    by_owner: HashMap<Identity, Vec<RecordId>>,
}

impl MemoryBackendInner {
    fn slot_mut(&mut self, id: RecordId) -> Result<&mut Record> {
        if id.get() == 0 {
            return Err(StoreError::RecordNotFound(id));
        }
        self.records
            .get_mut(id.index())
            .filter(|r| r.exists)
            .ok_or(StoreError::RecordNotFound(id))
    }
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryBackendInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryBackendInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn next_id(&self) -> Result<RecordId> {
        Ok(RecordId(self.read().records.len() as u64 + 1))
    }

    async fn insert_record(&self, record: &Record) -> Result<()> {
        let mut inner = self.write();

        let expected = RecordId(inner.records.len() as u64 + 1);
        if record.id != expected {
            return Err(StoreError::OutOfOrder {
                expected,
                got: record.id,
            });
        }

        inner.records.push(record.clone());
        inner.by_owner.entry(record.owner).or_default().push(record.id);
        Ok(())
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        if id.get() == 0 {
            return Ok(None);
        }
        let inner = self.read();
        Ok(inner
            .records
            .get(id.index())
            .filter(|r| r.exists)
            .cloned())
    }

    async fn set_rating_handle(&self, id: RecordId, handle: HandleId) -> Result<()> {
        self.write().slot_mut(id)?.rating_handle = handle;
        Ok(())
    }

    async fn set_visible(&self, id: RecordId, visible: bool) -> Result<()> {
        self.write().slot_mut(id)?.visible = visible;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read().records.len() as u64)
    }

    async fn records_of(&self, owner: &Identity) -> Result<Vec<RecordId>> {
        Ok(self.read().by_owner.get(owner).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veilstore_core::RecordFields;

    fn record(id: u64, owner: Identity) -> Record {
        Record::new(
            RecordId(id),
            RecordFields::new("Acme", "Tools", "a@x"),
            HandleId::generate(),
            false,
            owner,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let backend = MemoryBackend::new();
        let owner = Identity::from_bytes([1; 32]);

        assert_eq!(backend.next_id().await.unwrap(), RecordId::FIRST);
        let r = record(1, owner);
        backend.insert_record(&r).await.unwrap();

        assert_eq!(backend.get_record(RecordId(1)).await.unwrap(), Some(r));
        assert_eq!(backend.count().await.unwrap(), 1);
        assert_eq!(backend.next_id().await.unwrap(), RecordId(2));
    }

    #[tokio::test]
    async fn test_out_of_order_insert_rejected() {
        let backend = MemoryBackend::new();
        let owner = Identity::from_bytes([1; 32]);

        let err = backend.insert_record(&record(2, owner)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::OutOfOrder {
                expected: RecordId(1),
                got: RecordId(2)
            }
        ));

        backend.insert_record(&record(1, owner)).await.unwrap();
        assert!(backend.insert_record(&record(1, owner)).await.is_err());
        assert_eq!(backend.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_ids_return_none() {
        let backend = MemoryBackend::new();
        backend
            .insert_record(&record(1, Identity::from_bytes([1; 32])))
            .await
            .unwrap();

        assert!(backend.get_record(RecordId(0)).await.unwrap().is_none());
        assert!(backend.get_record(RecordId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mutations_touch_only_their_column() {
        let backend = MemoryBackend::new();
        let r = record(1, Identity::from_bytes([1; 32]));
        backend.insert_record(&r).await.unwrap();

        let new_handle = HandleId::generate();
        backend.set_rating_handle(RecordId(1), new_handle).await.unwrap();
        backend.set_visible(RecordId(1), true).await.unwrap();

        let stored = backend.get_record(RecordId(1)).await.unwrap().unwrap();
        assert_eq!(stored.rating_handle, new_handle);
        assert!(stored.visible);
        assert_eq!(stored.fields, r.fields);
        assert_eq!(stored.owner, r.owner);
    }

    #[tokio::test]
    async fn test_mutating_missing_record_fails() {
        let backend = MemoryBackend::new();
        let err = backend.set_visible(RecordId(4), true).await.unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound(RecordId(4))));
    }

    #[tokio::test]
    async fn test_records_of_owner() {
        let backend = MemoryBackend::new();
        let alice = Identity::from_bytes([0xA1; 32]);
        let bob = Identity::from_bytes([0xB0; 32]);

        backend.insert_record(&record(1, alice)).await.unwrap();
        backend.insert_record(&record(2, bob)).await.unwrap();
        backend.insert_record(&record(3, alice)).await.unwrap();

        assert_eq!(
            backend.records_of(&alice).await.unwrap(),
            vec![RecordId(1), RecordId(3)]
        );
        assert_eq!(backend.records_of(&bob).await.unwrap(), vec![RecordId(2)]);
        assert!(backend
            .records_of(&Identity::from_bytes([0; 32]))
            .await
            .unwrap()
            .is_empty());
    }

    proptest::proptest! {
        #[test]
        fn owner_index_partitions_ids(owners in proptest::collection::vec(0u8..4, 0..32)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let backend = MemoryBackend::new();
                for (i, owner) in owners.iter().enumerate() {
                    let r = record(i as u64 + 1, Identity::from_bytes([*owner; 32]));
                    backend.insert_record(&r).await.unwrap();
                }

                let mut all = Vec::new();
                for owner in 0u8..4 {
                    all.extend(
                        backend
                            .records_of(&Identity::from_bytes([owner; 32]))
                            .await
                            .unwrap(),
                    );
                }
                all.sort();

                let expected: Vec<_> = (1..=owners.len() as u64).map(RecordId).collect();
                assert_eq!(all, expected);
                assert_eq!(backend.next_id().await.unwrap(), RecordId(owners.len() as u64 + 1));
            });
        }
    }
}
