//! Notifications emitted to subscribers after a state change.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::types::{RecordId, RequestId};

/// An event delivered to external observers.
///
/// `Decrypted` is the only variant that carries a plaintext rating, and it is
/// only ever emitted for a request the owner made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    RecordCreated {
        id: RecordId,
        name: String,
        owner: Identity,
    },
    RatingUpdated {
        id: RecordId,
        caller: Identity,
    },
    PreferenceUpdated {
        id: RecordId,
        caller: Identity,
    },
    Decrypted {
        request_id: RequestId,
        record_id: RecordId,
        owner: Identity,
        rating: u8,
    },
}

impl Notification {
    /// The record this notification concerns.
    pub fn record_id(&self) -> RecordId {
        match self {
            Notification::RecordCreated { id, .. }
            | Notification::RatingUpdated { id, .. }
            | Notification::PreferenceUpdated { id, .. } => *id,
            Notification::Decrypted { record_id, .. } => *record_id,
        }
    }

    pub fn is_decrypted(&self) -> bool {
        matches!(self, Notification::Decrypted { .. })
    }
}
