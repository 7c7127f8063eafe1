//! The decryption coordinator: owner-gated, asynchronous unseal requests.
//!
//! A request moves `Idle -> Requested -> Resolved`. Submission checks
//! ownership, hands a completion handler to the gateway and returns the
//! request id at once. A listener task waits for the handler to fire,
//! publishes [`Notification::Decrypted`] and discards the request.
//!
//! There is no failed state. If the gateway drops the handler without a
//! value, the request is discarded with a warning.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, oneshot};
use tracing::{debug, warn};

use veilstore_core::{authorize, HandleId, Identity, Notification, Record, RecordId, RequestId};
use veilstore_gateway::Gateway;

use crate::error::{RegistryError, Result};

/// An in-flight unseal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionRequest {
    pub request_id: RequestId,
    pub record_id: RecordId,
    pub handle: HandleId,
    pub requester: Identity,
}

type PendingMap = HashMap<RequestId, DecryptionRequest>;

/// Tracks pending requests and turns gateway completions into notifications.
pub struct DecryptionCoordinator<G: Gateway> {
    gateway: Arc<G>,
    pending: Arc<Mutex<PendingMap>>,
    notifications: broadcast::Sender<Notification>,
}

fn lock(pending: &Mutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

impl<G: Gateway + 'static> DecryptionCoordinator<G> {
    pub fn new(gateway: Arc<G>, notifications: broadcast::Sender<Notification>) -> Self {
        Self {
            gateway,
            pending: Arc::new(Mutex::new(HashMap::new())),
            notifications,
        }
    }

    /// Submit an unseal of `record`'s rating on behalf of `caller`.
    ///
    /// Fails with [`RegistryError::Unauthorized`] unless the caller owns the
    /// record; in that case no request is created and the gateway is not
    /// called. Does not wait for the unseal to complete.
    pub async fn submit(&self, record: &Record, caller: &Identity) -> Result<RequestId> {
        if !authorize(caller, record) {
            warn!(id = %record.id, %caller, "decryption refused: caller is not the owner");
            return Err(RegistryError::Unauthorized { caller: *caller });
        }

        let (on_unsealed, unsealed) = oneshot::channel();
        let request_id = self
            .gateway
            .request_unseal(&record.rating_handle, caller, on_unsealed)
            .await?;

        lock(&self.pending).insert(
            request_id,
            DecryptionRequest {
                request_id,
                record_id: record.id,
                handle: record.rating_handle,
                requester: *caller,
            },
        );
        debug!(%request_id, id = %record.id, "decryption requested");

        let pending = Arc::clone(&self.pending);
        let notifications = self.notifications.clone();
        tokio::spawn(async move {
            let outcome = unsealed.await;
            let Some(request) = lock(&pending).remove(&request_id) else {
                return;
            };

            match outcome {
                Ok(unsealed) => {
                    debug!(%request_id, id = %request.record_id, "decryption resolved");
                    // No subscribers is not an error.
                    let _ = notifications.send(Notification::Decrypted {
                        request_id,
                        record_id: request.record_id,
                        owner: request.requester,
                        rating: unsealed.plaintext,
                    });
                }
                Err(_) => {
                    warn!(
                        %request_id,
                        id = %request.record_id,
                        "unseal completed without a value, request discarded"
                    );
                }
            }
        });

        Ok(request_id)
    }

    /// Requests still waiting on the gateway, oldest first.
    pub fn pending(&self) -> Vec<DecryptionRequest> {
        let mut requests: Vec<_> = lock(&self.pending).values().cloned().collect();
        requests.sort_by_key(|r| r.request_id);
        requests
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        lock(&self.pending).contains_key(&request_id)
    }
}
