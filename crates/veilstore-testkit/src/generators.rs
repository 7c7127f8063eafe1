//! Proptest generators for property-based testing.

use proptest::prelude::*;

use veilstore_core::{Identity, Keypair, RatingBound, RecordFields};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a rating inside the standard bound.
pub fn valid_rating() -> impl Strategy<Value = i64> {
    let bound = RatingBound::STANDARD;
    i64::from(bound.min())..=i64::from(bound.max())
}

/// Generate a rating outside the standard bound.
pub fn invalid_rating() -> impl Strategy<Value = i64> {
    let bound = RatingBound::STANDARD;
    prop_oneof![
        i64::MIN..i64::from(bound.min()),
        (i64::from(bound.max()) + 1)..=i64::MAX,
        Just(0),
        Just(i64::from(bound.max()) + 1),
    ]
}

/// Generate a non-empty field value.
pub fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9@. -]{1,24}".prop_map(String::from)
}

/// Generate valid record fields.
pub fn record_fields() -> impl Strategy<Value = RecordFields> {
    (field(), field(), field()).prop_map(|(name, category, contact)| RecordFields {
        name,
        category,
        contact,
    })
}

/// Generate record fields with at least one empty value.
pub fn incomplete_fields() -> impl Strategy<Value = RecordFields> {
    (record_fields(), 0usize..3).prop_map(|(mut fields, blank)| {
        match blank {
            0 => fields.name.clear(),
            1 => fields.category.clear(),
            _ => fields.contact.clear(),
        }
        fields
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_ratings_pass_the_bound(r in valid_rating()) {
            prop_assert!(RatingBound::STANDARD.check(r).is_ok());
        }

        #[test]
        fn invalid_ratings_fail_the_bound(r in invalid_rating()) {
            prop_assert!(RatingBound::STANDARD.check(r).is_err());
        }

        #[test]
        fn incomplete_fields_fail_validation(fields in incomplete_fields()) {
            prop_assert!(fields.validate().is_err());
        }

        #[test]
        fn generated_fields_validate(fields in record_fields()) {
            prop_assert!(fields.validate().is_ok());
        }
    }
}
