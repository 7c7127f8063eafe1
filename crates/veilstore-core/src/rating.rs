//! Bounded ratings: the plaintext domain of the protected attribute.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Placeholder returned wherever a rating would be disclosed to a reader
/// without decryption rights.
pub const RATING_SENTINEL: u8 = 0;

/// Inclusive bound a plaintext must satisfy before it can be sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBound {
    min: u8,
    max: u8,
}

impl RatingBound {
    /// The bound used for record ratings: [1, 10].
    pub const STANDARD: Self = Self { min: 1, max: 10 };

    /// Create a bound. The minimum must be at least 1 so the sentinel is
    /// never a legal plaintext.
    pub fn new(min: u8, max: u8) -> Result<Self, ValidationError> {
        if min == RATING_SENTINEL || min > max {
            return Err(ValidationError::InvalidBound { min, max });
        }
        Ok(Self { min, max })
    }

    pub const fn min(&self) -> u8 {
        self.min
    }

    pub const fn max(&self) -> u8 {
        self.max
    }

    /// Check a raw value against the bound.
    pub fn check(&self, value: i64) -> Result<Rating, ValidationError> {
        if value < i64::from(self.min) || value > i64::from(self.max) {
            return Err(ValidationError::RatingOutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(Rating(value as u8))
    }

    pub fn contains(&self, rating: Rating) -> bool {
        rating.0 >= self.min && rating.0 <= self.max
    }
}

impl Default for RatingBound {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A plaintext rating that has passed a bound check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    /// Validate against the standard bound.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        RatingBound::STANDARD.check(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}
