//! # Error Types
//!
//! Errors raised while encoding or decoding numeric-safe text.

use thiserror::Error;

/// Errors from the numeric-safe codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A big-integer marker is present but its payload is not a valid
    /// base-10 integer literal.
    #[error("Malformed encoding: big-integer marker payload {payload} is not an integer literal")]
    MalformedEncoding { payload: String },

    /// The input is not well-formed text for this codec.
    #[error("Invalid encoded text: {0}")]
    InvalidText(#[source] serde_json::Error),

    /// The document decoded but does not match the requested type.
    #[error("Decoded document does not match the expected shape: {0}")]
    ShapeMismatch(#[source] serde_json::Error),

    /// The value could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CodecError {
    /// True when the failure is a malformed big-integer marker.
    #[must_use]
    pub fn is_malformed_encoding(&self) -> bool {
        matches!(self, Self::MalformedEncoding { .. })
    }
}
