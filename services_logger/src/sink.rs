//! Log sinks
//!
//! A sink is the final destination of log entries. Sinks must tolerate
//! concurrent writers and must never fail back into the caller.

use crate::LogEntry;
use parking_lot::Mutex;
use std::io::Write;

/// Destination for log entries
pub trait LogSink: Send + Sync {
    /// Writes one entry
    fn write(&self, entry: &LogEntry);
}

/// Sink that discards every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _entry: &LogEntry) {}
}

/// Sink that writes rendered entries to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, entry: &LogEntry) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        // A closed stderr is not the caller's problem.
        let _ = writeln!(handle, "{}", entry.render());
    }
}

/// Sink that keeps entries in memory
///
/// Used by tests to assert on what was logged.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of captured entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Returns the number of captured entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Checks if nothing has been captured
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Discards all captured entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
