//! Registry configuration.

use veilstore_core::{Identity, RatingBound};

/// Domain string the default store identity is derived from.
pub const STORE_IDENTITY_DOMAIN: &str = "veilstore-store";

/// Configuration for the Registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Bound every rating must satisfy before it is sealed.
    pub rating_bound: RatingBound,
    /// Capacity of the notification broadcast channel.
    pub notification_capacity: usize,
    /// Identity the registry grants itself on every sealed handle.
    pub store_identity: Identity,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rating_bound: RatingBound::STANDARD,
            notification_capacity: 256,
            store_identity: Identity::derive(STORE_IDENTITY_DOMAIN),
        }
    }
}

impl RegistryConfig {
    pub fn with_rating_bound(mut self, bound: RatingBound) -> Self {
        self.rating_bound = bound;
        self
    }

    /// Set the channel capacity. Zero is raised to one.
    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity.max(1);
        self
    }

    pub fn with_store_identity(mut self, identity: Identity) -> Self {
        self.store_identity = identity;
        self
    }
}
