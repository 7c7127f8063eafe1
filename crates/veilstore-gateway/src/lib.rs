//! # Veilstore Gateway
//!
//! The encryption gateway: the only component that ever holds a rating
//! plaintext after it has been submitted.
//!
//! ## Overview
//!
//! The gateway turns a bounded plaintext into an opaque [`HandleId`],
//! tracks which identities may unseal each handle, and resolves unseal
//! requests asynchronously through a completion handler registered at
//! request time.
//!
//! ## Key Concepts
//!
//! - **Seal**: Encrypt a plaintext under a fresh handle. No grants attached.
//! - **Grant**: Add an identity to a handle's capability set. Append-only.
//! - **Unseal request**: Accepted immediately, completed later, exactly once.
//!
//! ## Encryption Model
//!
//! 1. **Master key**: One per gateway, never used to encrypt directly
//! 2. **Seal key**: Derived per handle from the master key with Blake3
//! 3. **Envelope**: ChaCha20-Poly1305 ciphertext with the handle as associated
//!    data, so an envelope cannot be replayed under another handle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veilstore_core::{Identity, RatingBound};
//! use veilstore_gateway::{Gateway, LocalGateway};
//!
//! async fn example(owner: Identity) {
//!     let gateway = LocalGateway::default();
//!     let handle = gateway.seal(7, RatingBound::STANDARD).await.unwrap();
//!     gateway.grant(&handle, &owner).await.unwrap();
//!
//!     let (tx, rx) = tokio::sync::oneshot::channel();
//!     gateway.request_unseal(&handle, &owner, tx).await.unwrap();
//!     let unsealed = rx.await.unwrap();
//!     assert_eq!(unsealed.plaintext, 7);
//! }
//! ```
//!
//! [`HandleId`]: veilstore_core::HandleId

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod grant;

pub use crypto::{EncryptionKey, EncryptionNonce, MasterKey};
pub use envelope::{SealFormat, SealedEnvelope};
pub use error::{GatewayError, Result};
pub use gateway::{CompletionHandler, Gateway, GatewayConfig, LocalGateway, Unsealed};
pub use grant::{CapabilitySet, Grant};
