//! # Veilstore Store
//!
//! Record persistence for Veilstore. Provides a trait-based interface with
//! SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The registry talks to storage only through [`RecordBackend`], so it is
//! storage-agnostic. [`SqliteBackend`] persists records to disk;
//! [`MemoryBackend`] keeps them in a dense arena for tests and ephemeral use.
//!
//! Backends store the opaque rating handle, never a rating value.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veilstore_store::{RecordBackend, SqliteBackend};
//!
//! async fn example() -> veilstore_store::Result<()> {
//!     let backend = SqliteBackend::open("records.db")?;
//!     let next = backend.next_id().await?;
//!     println!("next record id: {}", next);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use traits::RecordBackend;
