//! # Veilstore Testkit
//!
//! Testing utilities for Veilstore.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Deterministic parties and ready-made registries on either
//!   backend
//! - **Generators**: Proptest strategies for ratings, fields and identities
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veilstore_testkit::generators::{invalid_rating, record_fields};
//!
//! proptest! {
//!     #[test]
//!     fn out_of_bound_ratings_are_rejected(fields in record_fields(), r in invalid_rating()) {
//!         // create(fields, r, ..) must fail and leave count() unchanged
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use veilstore_testkit::fixtures::{acme_fields, memory_registry, TestParty};
//!
//! async fn example() {
//!     let registry = memory_registry();
//!     let alice = TestParty::alice().identity();
//!     let id = registry.create(acme_fields(), 7, false, alice).await.unwrap();
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    acme_fields, memory_registry, memory_registry_with, multi_party_fixtures, sqlite_registry,
    wait_for_decrypted, MemoryRegistry, SqliteRegistry, TestParty,
};
