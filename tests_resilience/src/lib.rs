//! Resilience Test Utilities
//!
//! This crate provides shared fixtures for the cross-crate property tests.
//!
//! ## Test Philosophy
//!
//! - **No leaks**: Every reference a container takes is given back on teardown
//! - **No partial mutation**: A failed operation leaves its operands unchanged
//! - **Shared ownership**: Tearing down a container never frees a member someone else holds

use ipc::{Backend, CodecConfig, Deserializer};
use object_kernel::{ObjectError, ObjectRef, SetRef, StringRef};
use services_logger::{Logger, MemorySink};
use std::sync::Arc;

/// Allocates `n` distinct root objects
pub fn object_pool(n: usize) -> Vec<ObjectRef> {
    (0..n).map(|_| ObjectRef::new_raw()).collect()
}

/// Allocates one string per word
pub fn string_pool(words: &[&str]) -> Vec<StringRef> {
    words.iter().map(|word| StringRef::from_text(word)).collect()
}

/// Builds a set holding every object in `members`
///
/// Fails on the first member the set refuses.
pub fn set_of<'a>(
    members: impl IntoIterator<Item = &'a ObjectRef>,
) -> Result<SetRef, ObjectError> {
    let set = SetRef::new();
    for member in members {
        set.insert(member)?;
    }
    Ok(set)
}

/// Splits a pool into the members at odd and even 1-based positions
pub fn split_odd_even(pool: &[ObjectRef]) -> Result<(SetRef, SetRef), ObjectError> {
    let odd = set_of(pool.iter().step_by(2))?;
    let even = set_of(pool.iter().skip(1).step_by(2))?;
    Ok((odd, even))
}

/// Creates a logger that records every entry
pub fn memory_logger() -> (Logger, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Logger::new(sink.clone()), sink)
}

/// Creates a JSON deserializer with default settings
pub fn json_deserializer(logger: Logger) -> Box<dyn Deserializer> {
    Backend::Json.deserializer(&CodecConfig::default(), logger)
}
