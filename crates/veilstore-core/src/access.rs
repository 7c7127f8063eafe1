//! Owner-based access predicates.
//!
//! Pure functions with no state. Every owner-gated operation evaluates these
//! before it touches storage or the gateway.

use crate::crypto::Identity;
use crate::record::Record;

/// Whether `caller` owns `record`.
pub fn authorize(caller: &Identity, record: &Record) -> bool {
    *caller == record.owner
}

/// Whether `caller` owns at least one of the two records.
///
/// Used by operations that read across two records.
pub fn authorize_either(caller: &Identity, a: &Record, b: &Record) -> bool {
    authorize(caller, a) || authorize(caller, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;
    use crate::types::{HandleId, RecordId};

    fn record_owned_by(owner: Identity, id: u64) -> Record {
        Record::new(
            RecordId(id),
            RecordFields::new("n", "c", "x"),
            HandleId::generate(),
            false,
            owner,
        )
    }

    #[test]
    fn test_authorize_owner_only() {
        let alice = Identity::from_bytes([0xA1; 32]);
        let bob = Identity::from_bytes([0xB0; 32]);
        let record = record_owned_by(alice, 1);

        assert!(authorize(&alice, &record));
        assert!(!authorize(&bob, &record));
    }

    #[test]
    fn test_authorize_either_is_disjunctive() {
        let alice = Identity::from_bytes([0xA1; 32]);
        let bob = Identity::from_bytes([0xB0; 32]);
        let carol = Identity::from_bytes([0xC0; 32]);
        let a = record_owned_by(alice, 1);
        let b = record_owned_by(bob, 2);

        assert!(authorize_either(&alice, &a, &b));
        assert!(authorize_either(&bob, &a, &b));
        assert!(!authorize_either(&carol, &a, &b));
    }
}
