//! Envelope decoding errors.

use thiserror::Error;

/// Result alias for envelope decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Failure to turn a request body into an [`crate::Envelope`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not valid JSON or does not match the envelope shape.
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `object` discriminator is present but empty.
    #[error("Envelope object discriminator is empty")]
    EmptyObject,
}
