//! Error types for the event stream.

use thiserror::Error;

/// Errors that can occur while handling events.
#[derive(Debug, Error)]
pub enum EventError {
    /// Failed to serialize an event.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for event operations.
pub type Result<T> = std::result::Result<T, EventError>;
