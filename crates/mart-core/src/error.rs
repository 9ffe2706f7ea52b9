//! Error types for mart-core.

use thiserror::Error;

/// Errors that can occur when constructing core primitives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid amount (overflow, underflow, or malformed text).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Rating outside the accepted star range.
    #[error("rating must be between {min} and {max}, got {got}")]
    InvalidRating {
        /// Lowest accepted rating.
        min: u8,
        /// Highest accepted rating.
        max: u8,
        /// The rejected value.
        got: u8,
    },
}
