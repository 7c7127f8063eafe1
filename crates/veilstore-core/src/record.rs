//! Records: the entities held by the store.
//!
//! A record mixes plaintext fields with one sealed attribute. The sealed
//! attribute is only ever present as a [`HandleId`]; nothing in this module
//! can see the plaintext behind it.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::error::ValidationError;
use crate::rating::RATING_SENTINEL;
use crate::types::{HandleId, RecordId};

/// The plaintext part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub category: String,
    pub contact: String,
}

impl RecordFields {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            contact: contact.into(),
        }
    }

    /// Reject the fields if any required one is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.category.is_empty() {
            return Err(ValidationError::EmptyField("category"));
        }
        if self.contact.is_empty() {
            return Err(ValidationError::EmptyField("contact"));
        }
        Ok(())
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned once at creation, never changed.
    pub id: RecordId,

    /// Plaintext fields.
    pub fields: RecordFields,

    /// Handle of the sealed rating. Replaced wholesale on every rating update.
    pub rating_handle: HandleId,

    /// Owner-only preference flag.
    pub visible: bool,

    /// The identity that created the record.
    pub owner: Identity,

    /// Always true once the record is stored; there is no deletion path.
    pub exists: bool,
}

impl Record {
    pub fn new(
        id: RecordId,
        fields: RecordFields,
        rating_handle: HandleId,
        visible: bool,
        owner: Identity,
    ) -> Self {
        Self {
            id,
            fields,
            rating_handle,
            visible,
            owner,
            exists: true,
        }
    }

    /// The public projection of this record.
    pub fn view(&self) -> RecordView {
        RecordView {
            id: self.id,
            name: self.fields.name.clone(),
            category: self.fields.category.clone(),
            contact: self.fields.contact.clone(),
            owner: self.owner,
            rating: RATING_SENTINEL,
        }
    }
}

/// What any reader gets back from a record lookup.
///
/// Carries neither the rating plaintext nor its handle; `rating` is always
/// [`RATING_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub contact: String,
    pub owner: Identity,
    pub rating: u8,
}
