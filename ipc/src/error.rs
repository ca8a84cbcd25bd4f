//! Codec errors

use object_kernel::ObjectError;
use thiserror::Error;

/// Errors returned by serializers and deserializers
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input is not valid for the backend's format
    #[error("Malformed input at line {line}, column {column}: {reason}")]
    Malformed {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Input of {len} bytes exceeds the limit of {limit}")]
    TooLarge { len: usize, limit: usize },

    #[error("Encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Object(#[from] ObjectError),
}

impl CodecError {
    /// Checks whether the error was caused by the input itself
    pub fn is_input_error(&self) -> bool {
        matches!(self, CodecError::Malformed { .. } | CodecError::TooLarge { .. })
    }
}
