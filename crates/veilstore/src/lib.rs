//! # Veilstore
//!
//! The unified API for Veilstore: a record registry where one attribute of
//! every record, its rating, is sealed by an encryption gateway and can only
//! be recovered by the record's owner.
//!
//! ## Overview
//!
//! - **Records**: Plaintext fields plus an opaque handle to the sealed rating
//! - **Gateway**: Seals ratings, holds per-handle capability grants, unseals
//!   asynchronously
//! - **Access control**: The owner is the only identity that can mutate a
//!   record or decrypt its rating
//! - **Notifications**: Every change is broadcast to subscribers
//!
//! ## Key Concepts
//!
//! - **Sentinel**: Reads never disclose a rating; they report `0`.
//! - **Rotation**: Updating a rating seals a new handle. The old one is
//!   abandoned with its grants.
//! - **Decryption**: Fire-and-forget. The plaintext arrives later as a
//!   [`Notification::Decrypted`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veilstore::{Registry, RegistryConfig};
//! use veilstore::core::{Keypair, Notification, RecordFields};
//! use veilstore::gateway::LocalGateway;
//! use veilstore::store::SqliteBackend;
//!
//! async fn example() -> veilstore::Result<()> {
//!     let owner = Keypair::generate().identity();
//!
//!     let backend = SqliteBackend::open("records.db")?;
//!     let registry = Registry::new(backend, LocalGateway::default(), RegistryConfig::default());
//!     let mut notifications = registry.subscribe();
//!
//!     let id = registry
//!         .create(RecordFields::new("Acme", "Tools", "a@x"), 7, false, owner)
//!         .await?;
//!     registry.request_decryption(id, &owner).await?;
//!
//!     while let Ok(n) = notifications.recv().await {
//!         if let Notification::Decrypted { rating, .. } = n {
//!             println!("rating of {} is {}", id, rating);
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `veilstore::core` - Identities, ids, records, notifications
//! - `veilstore::gateway` - The encryption gateway
//! - `veilstore::store` - Storage backends

pub mod config;
pub mod coordinator;
pub mod error;
pub mod registry;

// Re-export component crates
pub use veilstore_core as core;
pub use veilstore_gateway as gateway;
pub use veilstore_store as store;

pub use config::RegistryConfig;
pub use coordinator::{DecryptionCoordinator, DecryptionRequest};
pub use error::{RegistryError, Result};
pub use registry::Registry;

pub use veilstore_core::{
    Identity, Keypair, Notification, RecordFields, RecordId, RecordView, RequestId,
};
