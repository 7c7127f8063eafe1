//! The Registry: unified API for confidential records.
//!
//! The Registry brings together record storage, the encryption gateway and
//! the decryption coordinator. Every mutation runs validate, then mutate,
//! then notify, under one sequencer, so a rejected call has no side effects
//! and no two mutations interleave.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use veilstore_core::{
    authorize, authorize_either, HandleId, Identity, Notification, Record, RecordFields, RecordId,
    RecordView, RequestId,
};
use veilstore_gateway::Gateway;
use veilstore_store::RecordBackend;

use crate::config::RegistryConfig;
use crate::coordinator::DecryptionCoordinator;
use crate::error::{RegistryError, Result};

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Creating records with a sealed rating
/// - Reading public fields (the rating is always the sentinel)
/// - Owner-only updates of the rating and the visibility flag
/// - Owner-only asynchronous decryption
pub struct Registry<B: RecordBackend, G: Gateway> {
    backend: B,
    gateway: Arc<G>,
    coordinator: DecryptionCoordinator<G>,
    notifications: broadcast::Sender<Notification>,
    sequencer: Mutex<()>,
    config: RegistryConfig,
}

impl<B: RecordBackend, G: Gateway + 'static> Registry<B, G> {
    /// Create a new registry over `backend` and `gateway`.
    pub fn new(backend: B, gateway: G, config: RegistryConfig) -> Self {
        let gateway = Arc::new(gateway);
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        let coordinator = DecryptionCoordinator::new(Arc::clone(&gateway), notifications.clone());

        Self {
            backend,
            gateway,
            coordinator,
            notifications,
            sequencer: Mutex::new(()),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn coordinator(&self) -> &DecryptionCoordinator<G> {
        &self.coordinator
    }

    /// Subscribe to notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a record and seal its rating.
    ///
    /// Fails with a validation error, allocating no id, if a field is empty
    /// or the rating is outside the configured bound.
    pub async fn create(
        &self,
        fields: RecordFields,
        rating: i64,
        visible: bool,
        owner: Identity,
    ) -> Result<RecordId> {
        let _seq = self.sequencer.lock().await;

        fields.validate()?;
        self.config.rating_bound.check(rating)?;

        let id = self.backend.next_id().await?;
        let handle = self.seal_and_grant(rating, &owner).await?;

        let record = Record::new(id, fields, handle, visible, owner);
        self.backend.insert_record(&record).await?;

        info!(%id, %owner, "record created");
        self.emit(Notification::RecordCreated {
            id,
            name: record.fields.name,
            owner,
        });
        Ok(id)
    }

    /// Replace the rating of a record with a freshly sealed one.
    ///
    /// The previous handle and its grants are abandoned.
    pub async fn update_rating(&self, id: RecordId, rating: i64, caller: &Identity) -> Result<()> {
        let _seq = self.sequencer.lock().await;

        let record = self.fetch(id).await?;
        self.require_owner(caller, &record)?;
        self.config.rating_bound.check(rating)?;

        let handle = self.seal_and_grant(rating, &record.owner).await?;
        self.backend.set_rating_handle(id, handle).await?;

        info!(%id, old = %record.rating_handle, new = %handle, "rating rotated");
        self.emit(Notification::RatingUpdated {
            id,
            caller: *caller,
        });
        Ok(())
    }

    /// Overwrite the visibility flag of a record.
    pub async fn update_visibility(
        &self,
        id: RecordId,
        visible: bool,
        caller: &Identity,
    ) -> Result<()> {
        let _seq = self.sequencer.lock().await;

        let record = self.fetch(id).await?;
        self.require_owner(caller, &record)?;

        self.backend.set_visible(id, visible).await?;

        debug!(%id, visible, "visibility updated");
        self.emit(Notification::PreferenceUpdated {
            id,
            caller: *caller,
        });
        Ok(())
    }

    /// Ask the gateway to unseal a record's rating for its owner.
    ///
    /// Returns as soon as the request is accepted. The plaintext arrives
    /// later as [`Notification::Decrypted`].
    pub async fn request_decryption(&self, id: RecordId, caller: &Identity) -> Result<RequestId> {
        let _seq = self.sequencer.lock().await;

        let record = self.fetch(id).await?;
        self.coordinator.submit(&record, caller).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Public projection of a record. The rating is always the sentinel.
    pub async fn read(&self, id: RecordId) -> Result<RecordView> {
        Ok(self.fetch(id).await?.view())
    }

    /// The visibility flag for the owner, `false` for anyone else.
    pub async fn read_visibility(&self, id: RecordId, caller: &Identity) -> Result<bool> {
        let record = self.fetch(id).await?;
        Ok(authorize(caller, &record) && record.visible)
    }

    /// Compare the ratings of two records.
    ///
    /// Checks both ids and requires the caller to own at least one of the
    /// records, then fails with [`RegistryError::ComparisonUnavailable`]:
    /// the gateway offers no comparison over sealed values.
    pub async fn compare(&self, a: RecordId, b: RecordId, caller: &Identity) -> Result<bool> {
        let first = self.fetch(a).await?;
        let second = self.fetch(b).await?;

        if !authorize_either(caller, &first, &second) {
            warn!(%a, %b, %caller, "comparison refused: caller owns neither record");
            return Err(RegistryError::Unauthorized { caller: *caller });
        }

        Err(RegistryError::ComparisonUnavailable)
    }

    /// Number of records ever created.
    pub async fn count(&self) -> Result<u64> {
        Ok(self.backend.count().await?)
    }

    pub async fn exists(&self, id: RecordId) -> Result<bool> {
        Ok(self.backend.get_record(id).await?.is_some())
    }

    /// Current rating handle of a record. Owner only.
    pub async fn handle_of(&self, id: RecordId, caller: &Identity) -> Result<HandleId> {
        let record = self.fetch(id).await?;
        self.require_owner(caller, &record)?;
        Ok(record.rating_handle)
    }

    /// Ids of the records `owner` created, ascending.
    pub async fn records_of(&self, owner: &Identity) -> Result<Vec<RecordId>> {
        Ok(self.backend.records_of(owner).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    async fn fetch(&self, id: RecordId) -> Result<Record> {
        self.backend
            .get_record(id)
            .await?
            .ok_or(RegistryError::RecordNotFound(id))
    }

    fn require_owner(&self, caller: &Identity, record: &Record) -> Result<()> {
        if authorize(caller, record) {
            return Ok(());
        }
        warn!(id = %record.id, %caller, "refused: caller is not the owner");
        Err(RegistryError::Unauthorized { caller: *caller })
    }

    /// Seal under a new handle, then grant the store and the owner.
    async fn seal_and_grant(&self, rating: i64, owner: &Identity) -> Result<HandleId> {
        let handle = self.gateway.seal(rating, self.config.rating_bound).await?;
        self.gateway
            .grant(&handle, &self.config.store_identity)
            .await?;
        self.gateway.grant(&handle, owner).await?;
        Ok(handle)
    }

    fn emit(&self, notification: Notification) {
        // Send only fails when nobody is subscribed.
        let _ = self.notifications.send(notification);
    }
}
