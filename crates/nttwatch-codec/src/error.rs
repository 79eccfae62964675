//! Error types for the NTT codecs.

use thiserror::Error;

/// Errors raised while decoding or encoding NTT messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Structural violation in input bytes: short buffer, unknown prefix, or
    /// a length field that runs past the end of the buffer.
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },

    /// A value handed to a constructor or encoder has the wrong shape, e.g. a
    /// manager id that is not 32 bytes.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CodecError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` for decode-time errors, which callers skip and log.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedPayload { .. })
    }
}

/// Copy a slice into a fixed 32-byte id, or fail with `InvalidField`.
pub(crate) fn bytes32(field: &'static str, value: &[u8]) -> Result<[u8; 32], CodecError> {
    value
        .try_into()
        .map_err(|_| CodecError::invalid_field(field, format!("must be 32 bytes, got {}", value.len())))
}
