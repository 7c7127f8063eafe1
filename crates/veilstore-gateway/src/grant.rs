//! Capability grants.
//!
//! A grant lets one identity request unsealing of one handle. Grants are
//! append-only: there is no revoke. Rotating a value means sealing it under a
//! new handle, which starts with an empty capability set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use veilstore_core::Identity;

/// One entry in a handle's grant log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Who may request unsealing.
    pub grantee: Identity,

    /// Position of this grant in the handle's log, from 1.
    pub seq: u64,
}

/// The set of identities that may unseal a single handle.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    members: HashSet<Identity>,
    log: Vec<Grant>,
}

impl CapabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `grantee`. Returns `false` if it was already present.
    pub fn insert(&mut self, grantee: Identity) -> bool {
        if !self.members.insert(grantee) {
            return false;
        }
        let seq = self.log.len() as u64 + 1;
        self.log.push(Grant { grantee, seq });
        true
    }

    /// Check if `identity` holds a grant.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Grants in the order they were issued.
    pub fn grants(&self) -> &[Grant] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
