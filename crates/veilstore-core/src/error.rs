//! Error types for Veilstore core.

use thiserror::Error;

/// Input rejected before any state is touched.
///
/// Every variant is recoverable by retrying with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rating {value} is outside the bound [{min}, {max}]")]
    RatingOutOfRange { value: i64, min: u8, max: u8 },

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    #[error("record id {0} is not a valid id")]
    InvalidId(u64),

    #[error("invalid rating bound [{min}, {max}]")]
    InvalidBound { min: u8, max: u8 },
}
