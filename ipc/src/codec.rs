//! Serializer and deserializer capabilities
//!
//! A [`Deserializer`] consumes bytes from the front of a buffer and produces
//! at most one message per call. Three outcomes are distinguished:
//!
//! - a message was decoded (`consumed > 0`, `message` is `Some`)
//! - the input held nothing to decode: empty, whitespace, `{}` or `[]`
//!   (`message` is `None`; `consumed` covers whatever was skipped)
//! - the input is not valid, which is an error
//!
//! A buffer that ends in the middle of a value reports `consumed == 0` so the
//! caller can retry once more bytes arrive.

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::json::{JsonDeserializer, JsonSerializer};
use object_kernel::MessageRef;
use serde::{Deserialize, Serialize};
use services_logger::Logger;
use std::fmt;

/// Result of one deserialize call
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Bytes taken from the front of the buffer
    pub consumed: usize,
    /// The decoded message, if the input held one
    pub message: Option<MessageRef>,
}

impl Decoded {
    pub fn empty(consumed: usize) -> Self {
        Self {
            consumed,
            message: None,
        }
    }

    pub fn message(consumed: usize, message: MessageRef) -> Self {
        Self {
            consumed,
            message: Some(message),
        }
    }
}

/// Per-stream counters kept by a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecStats {
    pub messages_decoded: u64,
    pub bytes_consumed: u64,
    pub messages_encoded: u64,
    pub bytes_produced: u64,
}

/// Turns bytes into messages
pub trait Deserializer: Send {
    /// Decodes at most one message from the front of `buf`
    fn deserialize(&mut self, buf: &[u8]) -> Result<Decoded, CodecError>;

    /// Returns which backend this is
    fn backend(&self) -> Backend;

    /// Returns the counters for the current stream
    fn stats(&self) -> CodecStats;

    /// Clears per-stream state
    fn reset(&mut self);
}

/// Turns messages into bytes
pub trait Serializer: Send {
    /// Appends the encoding of `message` to `out` and returns the bytes written
    fn serialize(&mut self, message: &MessageRef, out: &mut Vec<u8>) -> Result<usize, CodecError>;

    fn backend(&self) -> Backend;

    fn stats(&self) -> CodecStats;
}

/// Available wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Json => "json",
        }
    }

    /// Constructs a deserializer for this backend
    pub fn deserializer(&self, config: &CodecConfig, logger: Logger) -> Box<dyn Deserializer> {
        match self {
            Backend::Json => Box::new(JsonDeserializer::new(config, logger)),
        }
    }

    /// Constructs a serializer for this backend
    pub fn serializer(&self, logger: Logger) -> Box<dyn Serializer> {
        match self {
            Backend::Json => Box::new(JsonSerializer::new(logger)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Messages drained from one buffer
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Bytes taken from the front of the buffer
    pub consumed: usize,
    pub messages: Vec<MessageRef>,
}

/// Decodes every complete message in `buf`
///
/// Stops at the end of the buffer or at a truncated trailing value, whose
/// bytes are left unconsumed. A malformed value fails the whole call.
pub fn decode_all(deserializer: &mut dyn Deserializer, buf: &[u8]) -> Result<Batch, CodecError> {
    let mut batch = Batch::default();
    while batch.consumed < buf.len() {
        let decoded = deserializer.deserialize(&buf[batch.consumed..])?;
        if decoded.consumed == 0 {
            break;
        }
        batch.consumed += decoded.consumed;
        batch.messages.extend(decoded.message);
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json() -> Box<dyn Deserializer> {
        Backend::Json.deserializer(&CodecConfig::default(), Logger::null())
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(Backend::Json.to_string(), "json");
        assert_eq!(Backend::default(), Backend::Json);
        assert_eq!(json().backend(), Backend::Json);
    }

    #[test]
    fn test_decode_all_stream() {
        let mut de = json();
        let batch = decode_all(de.as_mut(), br#"{"a":1} {} {"b":2}"#).unwrap();
        assert_eq!(batch.messages.len(), 2);
        assert_eq!(batch.consumed, 18);
        assert_eq!(batch.messages[1].field("b").unwrap(), Some(serde_json::json!(2)));
    }

    #[test]
    fn test_decode_all_leaves_truncated_tail() {
        let mut de = json();
        let input = br#"{"a":1}{"b":"#;
        let batch = decode_all(de.as_mut(), input).unwrap();
        assert_eq!(batch.messages.len(), 1);
        assert_eq!(batch.consumed, 7);
    }

    #[test]
    fn test_decode_all_empty() {
        let mut de = json();
        let batch = decode_all(de.as_mut(), b"").unwrap();
        assert_eq!(batch.consumed, 0);
        assert!(batch.messages.is_empty());
    }

    #[test]
    fn test_decode_all_rejects_malformed() {
        let mut de = json();
        assert!(matches!(
            decode_all(de.as_mut(), br#"{"a":1} }"#),
            Err(CodecError::Malformed { .. })
        ));
    }
}
