//! JSON backend

use crate::codec::{Backend, CodecStats, Decoded, Deserializer, Serializer};
use crate::config::CodecConfig;
use crate::error::CodecError;
use object_kernel::message::is_structurally_empty;
use object_kernel::{Message, MessageRef};
use serde_json::Value;
use services_logger::{LogContext, LogEntry, LogLevel, Logger};

const LOG_PREFIX: &str = "ipc.json";

/// Decodes one JSON value per call
///
/// Leading whitespace is skipped. A JSON object becomes a message whose
/// fields are the object's entries; any other non-empty value becomes the
/// message payload as-is.
pub struct JsonDeserializer {
    max_input_bytes: usize,
    logger: Logger,
    context: LogContext,
    stats: CodecStats,
}

impl JsonDeserializer {
    pub fn new(config: &CodecConfig, logger: Logger) -> Self {
        let level = logger.min_level().max(config.log_level);
        Self {
            max_input_bytes: config.max_input_bytes,
            logger: logger.with_min_level(level),
            context: LogContext::new(LOG_PREFIX),
            stats: CodecStats::default(),
        }
    }

    fn malformed(&self, err: &serde_json::Error) -> CodecError {
        let (line, column) = (err.line(), err.column());
        self.logger.log_entry(
            LogEntry::new(LogLevel::Warn, "malformed input".to_string())
                .with_context(&self.context)
                .with_field("line", line)
                .with_field("column", column),
        );
        let mut reason = err.to_string();
        if let Some(at) = reason.rfind(" at line ") {
            reason.truncate(at);
        }
        CodecError::Malformed {
            line,
            column,
            reason,
        }
    }

    fn consume(&mut self, consumed: usize) {
        self.stats.bytes_consumed += consumed as u64;
    }
}

impl Deserializer for JsonDeserializer {
    fn deserialize(&mut self, buf: &[u8]) -> Result<Decoded, CodecError> {
        if buf.len() > self.max_input_bytes {
            self.logger.warn(
                Some(&self.context),
                format_args!(
                    "rejecting {} byte input, limit is {}",
                    buf.len(),
                    self.max_input_bytes
                ),
            );
            return Err(CodecError::TooLarge {
                len: buf.len(),
                limit: self.max_input_bytes,
            });
        }

        let mut stream = serde_json::Deserializer::from_slice(buf).into_iter::<Value>();
        let value = match stream.next() {
            None => {
                let consumed = stream.byte_offset();
                self.consume(consumed);
                return Ok(Decoded::empty(consumed));
            }
            Some(Ok(value)) => value,
            Some(Err(err)) if err.is_eof() => {
                self.logger.debug(
                    Some(&self.context),
                    format_args!("incomplete value in {} bytes, waiting for more", buf.len()),
                );
                return Ok(Decoded::empty(0));
            }
            Some(Err(err)) => return Err(self.malformed(&err)),
        };

        let consumed = stream.byte_offset();
        self.consume(consumed);
        if is_structurally_empty(&value) {
            self.logger.debug(
                Some(&self.context),
                format_args!("empty container, {} bytes consumed", consumed),
            );
            return Ok(Decoded::empty(consumed));
        }

        let message = MessageRef::new(Message::new(value));
        self.stats.messages_decoded += 1;
        self.logger.debug(
            Some(&self.context),
            format_args!("decoded {} from {} bytes", message.as_object(), consumed),
        );
        Ok(Decoded::message(consumed, message))
    }

    fn backend(&self) -> Backend {
        Backend::Json
    }

    fn stats(&self) -> CodecStats {
        self.stats
    }

    fn reset(&mut self) {
        self.stats = CodecStats::default();
    }
}

/// Encodes a message's payload as compact JSON
pub struct JsonSerializer {
    logger: Logger,
    context: LogContext,
    stats: CodecStats,
}

impl JsonSerializer {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            context: LogContext::new(LOG_PREFIX),
            stats: CodecStats::default(),
        }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&mut self, message: &MessageRef, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        let start = out.len();
        let result = message.run(|message| serde_json::to_writer(&mut *out, message.body()));
        if !matches!(result, Ok(Ok(()))) {
            out.truncate(start);
        }
        result??;

        let written = out.len() - start;
        self.stats.messages_encoded += 1;
        self.stats.bytes_produced += written as u64;
        self.logger.debug(
            Some(&self.context),
            format_args!("encoded {} into {} bytes", message.as_object(), written),
        );
        Ok(written)
    }

    fn backend(&self) -> Backend {
        Backend::Json
    }

    fn stats(&self) -> CodecStats {
        self.stats
    }
}
