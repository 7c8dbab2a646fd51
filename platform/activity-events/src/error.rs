//! Error taxonomy for the producer send pipeline
//!
//! Validation and serialization problems are logic bugs and surface
//! synchronously at the call site. Transport failures surface only on the
//! synchronous send variant; the fire-and-forget path logs them instead,
//! because the business operation that triggered the event has already
//! committed.

use event_bus::BusError;

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// A required field is missing or blank; raised before any network I/O
    #[error("event validation failed: {0}")]
    Validation(String),

    /// The event could not be serialized to the wire format
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker rejected or never received the publish (synchronous
    /// variant only)
    #[error("failed to publish event: {0}")]
    Publish(#[from] BusError),
}

pub type ProducerResult<T> = Result<T, ProducerError>;
