//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::Path;
use std::time::Duration;

use tokio::sync::broadcast;

use veilstore::{Registry, RegistryConfig};
use veilstore_core::{Identity, Keypair, Notification, RecordFields, RequestId};
use veilstore_gateway::{GatewayConfig, LocalGateway};
use veilstore_store::{MemoryBackend, SqliteBackend};

/// How long helpers wait for an asynchronous notification.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

pub type MemoryRegistry = Registry<MemoryBackend, LocalGateway>;
pub type SqliteRegistry = Registry<SqliteBackend, LocalGateway>;

/// A party with a deterministic keypair.
#[derive(Clone)]
pub struct TestParty {
    pub keypair: Keypair,
}

impl TestParty {
    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    pub fn alice() -> Self {
        Self::with_seed([0xA1; 32])
    }

    pub fn bob() -> Self {
        Self::with_seed([0xB0; 32])
    }

    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }
}

/// Create multiple parties for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestParty> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            TestParty::with_seed(seed)
        })
        .collect()
}

/// The fields of the record used throughout the scenarios.
pub fn acme_fields() -> RecordFields {
    RecordFields::new("Acme", "Tools", "a@x")
}

/// A registry on the in-memory backend with an immediate gateway.
pub fn memory_registry() -> MemoryRegistry {
    memory_registry_with(GatewayConfig::default())
}

/// A registry on the in-memory backend with the given gateway scheduling.
pub fn memory_registry_with(gateway: GatewayConfig) -> MemoryRegistry {
    Registry::new(
        MemoryBackend::new(),
        LocalGateway::new(gateway),
        RegistryConfig::default(),
    )
}

/// A registry on a SQLite file at `path`.
pub fn sqlite_registry(path: impl AsRef<Path>) -> veilstore_store::Result<SqliteRegistry> {
    Ok(Registry::new(
        SqliteBackend::open(path)?,
        LocalGateway::default(),
        RegistryConfig::default(),
    ))
}

/// Wait for the `Decrypted` notification of `request_id` and return its
/// rating. Other notifications are skipped. `None` on timeout or when the
/// channel closes.
pub async fn wait_for_decrypted(
    rx: &mut broadcast::Receiver<Notification>,
    request_id: RequestId,
) -> Option<u8> {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(Notification::Decrypted {
                    request_id: got,
                    rating,
                    ..
                }) if got == request_id => return Some(rating),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    };
    tokio::time::timeout(NOTIFY_TIMEOUT, wait).await.ok().flatten()
}
