//! # Veilstore Core
//!
//! Pure types for Veilstore: identities, bounded ratings, records and the
//! notifications emitted when they change.
//!
//! This crate contains no I/O, no storage, no encryption. The sealed rating
//! of a record only appears here as an opaque [`HandleId`].
//!
//! ## Key Types
//!
//! - [`Identity`] - The caller/owner identity supplied by the ledger substrate
//! - [`RecordId`] - Dense, never-reused record identifier
//! - [`Rating`] / [`RatingBound`] - Plaintext domain of the protected attribute
//! - [`Record`] / [`RecordView`] - Stored entity and its public projection
//! - [`Notification`] - Events delivered to subscribers
//!
//! ## Access Control
//!
//! See the [`access`] module: ownership is the only capability a caller can
//! hold over a record.

pub mod access;
pub mod crypto;
pub mod error;
pub mod notification;
pub mod rating;
pub mod record;
pub mod types;

pub use access::{authorize, authorize_either};
pub use crypto::{Identity, Keypair};
pub use error::ValidationError;
pub use notification::Notification;
pub use rating::{Rating, RatingBound, RATING_SENTINEL};
pub use record::{Record, RecordFields, RecordView};
pub use types::{HandleId, RecordId, RequestId};
