//! # Logger Service
//!
//! This crate implements the logging collaborator used by the object substrate.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not ambient. A [`Logger`] is a handle
//! that is constructed once and passed to whoever needs it; there is no
//! process-global sink. Emitting an entry never fails and never panics.

pub mod sink;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use sink::{LogSink, MemorySink, NullSink, StderrSink};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Display context for log entries
///
/// A context names the component an entry came from. It is rendered as a
/// bracketed prefix in front of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    prefix: String,
}

impl LogContext {
    /// Creates a new context with the given display prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the display prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.prefix)
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Context prefix (if any)
    pub context: Option<String>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            level,
            context: None,
            message,
            fields: Vec::new(),
        }
    }

    /// Sets the context prefix
    pub fn with_context(mut self, context: &LogContext) -> Self {
        self.context = Some(context.prefix().to_string());
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Renders the entry as a single line
    pub fn render(&self) -> String {
        let mut line = String::new();
        if let Some(context) = &self.context {
            line.push('[');
            line.push_str(context);
            line.push_str("] ");
        }
        line.push_str(&self.level.to_string());
        line.push(' ');
        line.push_str(&self.message);
        for (key, value) in &self.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Handle to a log sink
///
/// Cloning a logger is cheap; all clones write to the same sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl Logger {
    /// Creates a logger writing to the given sink at [`LogLevel::Debug`] and above
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            min_level: LogLevel::Debug,
        }
    }

    /// Creates a logger that discards everything
    pub fn null() -> Self {
        Self::new(Arc::new(NullSink))
    }

    /// Creates a logger that writes to standard error
    pub fn stderr() -> Self {
        Self::new(Arc::new(StderrSink))
    }

    /// Sets the minimum level that reaches the sink
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Returns the minimum level
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Checks whether entries at `level` reach the sink
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Formats and emits a message
    ///
    /// A missing context is tolerated; the entry is then emitted without a prefix.
    pub fn log(&self, context: Option<&LogContext>, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let mut entry = LogEntry::new(level, args.to_string());
        if let Some(context) = context {
            entry = entry.with_context(context);
        }
        self.sink.write(&entry);
    }

    /// Emits a prebuilt entry
    pub fn log_entry(&self, entry: LogEntry) {
        if self.enabled(entry.level) {
            self.sink.write(&entry);
        }
    }

    pub fn debug(&self, context: Option<&LogContext>, args: fmt::Arguments<'_>) {
        self.log(context, LogLevel::Debug, args);
    }

    pub fn info(&self, context: Option<&LogContext>, args: fmt::Arguments<'_>) {
        self.log(context, LogLevel::Info, args);
    }

    pub fn warn(&self, context: Option<&LogContext>, args: fmt::Arguments<'_>) {
        self.log(context, LogLevel::Warn, args);
    }

    pub fn error(&self, context: Option<&LogContext>, args: fmt::Arguments<'_>) {
        self.log(context, LogLevel::Error, args);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}
