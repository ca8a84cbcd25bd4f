//! Codec settings

use crate::codec::Backend;
use serde::{Deserialize, Serialize};
use services_logger::LogLevel;

/// Largest buffer a deserializer accepts in one call by default (1 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Settings shared by every codec backend
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Which backend to construct
    pub backend: Backend,
    /// Inputs longer than this are rejected without being parsed
    pub max_input_bytes: usize,
    /// Minimum level of the codec's own log entries
    pub log_level: LogLevel,
}

impl CodecConfig {
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            log_level: LogLevel::Info,
        }
    }
}
