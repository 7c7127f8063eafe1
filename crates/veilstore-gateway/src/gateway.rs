//! The gateway: seal, grant, and asynchronous unseal.
//!
//! Unseal requests are accepted synchronously and resolved later on the
//! gateway's own schedule. The caller registers a completion handler when it
//! makes the request; the gateway fires it exactly once with the plaintext,
//! or drops it without a value if the sealed bytes cannot be opened.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

use veilstore_core::{HandleId, Identity, RatingBound, RequestId};

use crate::crypto::{EncryptionKey, MasterKey};
use crate::envelope::SealedEnvelope;
use crate::error::{GatewayError, Result};
use crate::grant::{CapabilitySet, Grant};

/// Scheduling behaviour of [`LocalGateway`].
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Fixed delay before an unseal completes.
    pub unseal_delay: Duration,
    /// Upper bound of an extra random delay added per request.
    pub unseal_jitter: Duration,
}

impl GatewayConfig {
    pub fn with_unseal_delay(mut self, delay: Duration) -> Self {
        self.unseal_delay = delay;
        self
    }

    pub fn with_unseal_jitter(mut self, jitter: Duration) -> Self {
        self.unseal_jitter = jitter;
        self
    }

    fn next_delay(&self) -> Duration {
        let jitter_ms = self.unseal_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.unseal_delay;
        }
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.unseal_delay + Duration::from_millis(extra)
    }
}

/// Delivered to the completion handler when an unseal finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsealed {
    pub request_id: RequestId,
    pub handle: HandleId,
    pub plaintext: u8,
}

/// Registered at request time; fired at most once.
pub type CompletionHandler = oneshot::Sender<Unsealed>;

/// The encryption service boundary.
///
/// Implementations own the mapping from handle to sealed bytes and the
/// capability set of every handle. Nothing outside a gateway ever sees a
/// plaintext except through a completion handler.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Seal `plaintext` under a fresh handle with no grants attached.
    ///
    /// Fails with [`GatewayError::Range`] if the plaintext is outside `bound`.
    async fn seal(&self, plaintext: i64, bound: RatingBound) -> Result<HandleId>;

    /// Add `grantee` to the handle's capability set. Idempotent.
    async fn grant(&self, handle: &HandleId, grantee: &Identity) -> Result<()>;

    /// Check whether `identity` holds a grant on the handle.
    async fn is_granted(&self, handle: &HandleId, identity: &Identity) -> Result<bool>;

    /// Grants on the handle in issue order.
    async fn grants(&self, handle: &HandleId) -> Result<Vec<Grant>>;

    /// Schedule an unseal and return immediately.
    ///
    /// Fails with [`GatewayError::Unauthorized`] unless `requester` holds a
    /// grant. On success `on_unsealed` fires later, on the gateway's schedule.
    async fn request_unseal(
        &self,
        handle: &HandleId,
        requester: &Identity,
        on_unsealed: CompletionHandler,
    ) -> Result<RequestId>;
}

struct SealedEntry {
    envelope: Vec<u8>,
    capabilities: CapabilitySet,
}

/// In-process gateway backed by ChaCha20-Poly1305.
///
/// Unseals run as tokio tasks, so `request_unseal` must be called from
/// within a runtime.
pub struct LocalGateway {
    master: MasterKey,
    config: GatewayConfig,
    sealed: RwLock<HashMap<HandleId, SealedEntry>>,
    next_request: AtomicU64,
}

impl LocalGateway {
    /// Create a gateway with a fresh random master key.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_master_key(MasterKey::generate(), config)
    }

    pub fn with_master_key(master: MasterKey, config: GatewayConfig) -> Self {
        Self {
            master,
            config,
            sealed: RwLock::new(HashMap::new()),
            next_request: AtomicU64::new(1),
        }
    }

    /// Number of handles ever sealed.
    pub fn handle_count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<HandleId, SealedEntry>> {
        self.sealed.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<HandleId, SealedEntry>> {
        self.sealed.write().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    fn corrupt(&self, handle: &HandleId) {
        if let Some(entry) = self.write().get_mut(handle) {
            if let Some(last) = entry.envelope.last_mut() {
                *last ^= 0xff;
            }
        }
    }
}

impl Default for LocalGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn seal(&self, plaintext: i64, bound: RatingBound) -> Result<HandleId> {
        let rating = bound.check(plaintext)?;

        let mut sealed = self.write();
        let handle = loop {
            let candidate = HandleId::generate();
            if !sealed.contains_key(&candidate) {
                break candidate;
            }
        };

        let key = self.master.seal_key(&handle);
        let envelope = SealedEnvelope::seal(&[rating.get()], &handle, &key)?.to_bytes()?;
        sealed.insert(
            handle,
            SealedEntry {
                envelope,
                capabilities: CapabilitySet::new(),
            },
        );

        debug!(%handle, "sealed value");
        Ok(handle)
    }

    async fn grant(&self, handle: &HandleId, grantee: &Identity) -> Result<()> {
        let mut sealed = self.write();
        let entry = sealed
            .get_mut(handle)
            .ok_or(GatewayError::HandleNotFound(*handle))?;

        if entry.capabilities.insert(*grantee) {
            debug!(%handle, %grantee, "capability granted");
        }
        Ok(())
    }

    async fn is_granted(&self, handle: &HandleId, identity: &Identity) -> Result<bool> {
        let sealed = self.read();
        let entry = sealed
            .get(handle)
            .ok_or(GatewayError::HandleNotFound(*handle))?;
        Ok(entry.capabilities.contains(identity))
    }

    async fn grants(&self, handle: &HandleId) -> Result<Vec<Grant>> {
        let sealed = self.read();
        let entry = sealed
            .get(handle)
            .ok_or(GatewayError::HandleNotFound(*handle))?;
        Ok(entry.capabilities.grants().to_vec())
    }

    async fn request_unseal(
        &self,
        handle: &HandleId,
        requester: &Identity,
        on_unsealed: CompletionHandler,
    ) -> Result<RequestId> {
        let envelope = {
            let sealed = self.read();
            let entry = sealed
                .get(handle)
                .ok_or(GatewayError::HandleNotFound(*handle))?;
            if !entry.capabilities.contains(requester) {
                warn!(%handle, %requester, "unseal refused: no capability");
                return Err(GatewayError::Unauthorized {
                    handle: *handle,
                    requester: *requester,
                });
            }
            entry.envelope.clone()
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| GatewayError::Scheduler(e.to_string()))?;

        let request_id = RequestId(self.next_request.fetch_add(1, Ordering::Relaxed));
        let key = self.master.seal_key(handle);
        let delay = self.config.next_delay();
        let handle = *handle;

        debug!(%request_id, %handle, ?delay, "unseal scheduled");

        runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match open(&envelope, &handle, &key) {
                Ok(plaintext) => {
                    let unsealed = Unsealed {
                        request_id,
                        handle,
                        plaintext,
                    };
                    if on_unsealed.send(unsealed).is_err() {
                        debug!(%request_id, "completion handler gone before delivery");
                    }
                }
                Err(e) => {
                    error!(%request_id, %handle, error = %e, "unseal failed; completion will not fire");
                }
            }
        });

        Ok(request_id)
    }
}

fn open(envelope: &[u8], handle: &HandleId, key: &EncryptionKey) -> Result<u8> {
    let plaintext = SealedEnvelope::from_bytes(envelope)?.open(handle, key)?;
    match plaintext.as_slice() {
        [value] => Ok(*value),
        other => Err(GatewayError::DecryptionError(format!(
            "expected 1 plaintext byte, got {}",
            other.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn alice() -> Identity {
        Identity::from_bytes([0xA1; 32])
    }

    fn bob() -> Identity {
        Identity::from_bytes([0xB0; 32])
    }

    #[tokio::test]
    async fn test_seal_rejects_out_of_bound() {
        let gateway = LocalGateway::default();

        for value in [0, 11, -1, 300] {
            let err = gateway.seal(value, RatingBound::STANDARD).await.unwrap_err();
            assert!(matches!(err, GatewayError::Range(_)));
        }
        assert_eq!(gateway.handle_count(), 0);
    }

    proptest::proptest! {
        #[test]
        fn test_seal_accepts_exactly_the_bound(value in -50i64..50) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let gateway = LocalGateway::default();
            let sealed = rt.block_on(gateway.seal(value, RatingBound::STANDARD)).is_ok();
            proptest::prop_assert_eq!(sealed, (1..=10).contains(&value));
        }
    }

    #[tokio::test]
    async fn test_seal_issues_fresh_handles_without_grants() {
        let gateway = LocalGateway::default();

        let h1 = gateway.seal(5, RatingBound::STANDARD).await.unwrap();
        let h2 = gateway.seal(5, RatingBound::STANDARD).await.unwrap();

        assert_ne!(h1, h2);
        assert!(gateway.grants(&h1).await.unwrap().is_empty());
        assert!(!gateway.is_granted(&h1, &alice()).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_unknown_handle_not_found() {
        let gateway = LocalGateway::default();
        let err = gateway
            .grant(&HandleId::generate(), &alice())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::HandleNotFound(_)));
    }

    #[tokio::test]
    async fn test_grant_is_idempotent() {
        let gateway = LocalGateway::default();
        let handle = gateway.seal(3, RatingBound::STANDARD).await.unwrap();

        gateway.grant(&handle, &alice()).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();

        assert_eq!(gateway.grants(&handle).await.unwrap().len(), 1);
        assert!(gateway.is_granted(&handle, &alice()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unseal_requires_grant() {
        let gateway = LocalGateway::default();
        let handle = gateway.seal(8, RatingBound::STANDARD).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();

        let (tx, rx) = oneshot::channel();
        let err = gateway.request_unseal(&handle, &bob(), tx).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized { .. }));

        // The refused handler is dropped, never fired.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_unseal_delivers_plaintext() {
        let gateway = LocalGateway::default();
        let handle = gateway.seal(8, RatingBound::STANDARD).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();

        let (tx, rx) = oneshot::channel();
        let request_id = gateway.request_unseal(&handle, &alice(), tx).await.unwrap();

        let unsealed = timeout(WAIT, rx).await.unwrap().unwrap();
        assert_eq!(
            unsealed,
            Unsealed {
                request_id,
                handle,
                plaintext: 8
            }
        );
    }

    #[tokio::test]
    async fn test_request_ids_are_distinct() {
        let gateway = LocalGateway::default();
        let handle = gateway.seal(2, RatingBound::STANDARD).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();

        let (tx1, _rx1) = oneshot::channel();
        let (tx2, _rx2) = oneshot::channel();
        let r1 = gateway.request_unseal(&handle, &alice(), tx1).await.unwrap();
        let r2 = gateway.request_unseal(&handle, &alice(), tx2).await.unwrap();
        assert_ne!(r1, r2);
    }

    #[tokio::test]
    async fn test_request_returns_before_completion() {
        let config = GatewayConfig::default().with_unseal_delay(Duration::from_millis(200));
        let gateway = LocalGateway::new(config);
        let handle = gateway.seal(6, RatingBound::STANDARD).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();

        let (tx, mut rx) = oneshot::channel();
        gateway.request_unseal(&handle, &alice(), tx).await.unwrap();

        assert!(rx.try_recv().is_err());
        let unsealed = timeout(WAIT, rx).await.unwrap().unwrap();
        assert_eq!(unsealed.plaintext, 6);
    }

    #[tokio::test]
    async fn test_corrupted_value_never_completes() {
        let gateway = LocalGateway::default();
        let handle = gateway.seal(4, RatingBound::STANDARD).await.unwrap();
        gateway.grant(&handle, &alice()).await.unwrap();
        gateway.corrupt(&handle);

        let (tx, rx) = oneshot::channel();
        gateway.request_unseal(&handle, &alice(), tx).await.unwrap();

        // Handler dropped without a value.
        assert!(timeout(WAIT, rx).await.unwrap().is_err());
    }
}
