//! Set construction settings

use serde::{Deserialize, Serialize};

/// Default number of slots reserved by a fresh set.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Settings applied when a set is created
///
/// Settings are plain data with baked-in defaults; there are no config
/// files or environment lookups behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Number of members the set can hold before it first grows
    pub initial_capacity: usize,
}

impl SetConfig {
    /// Creates settings with an explicit initial capacity
    pub const fn with_capacity(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}
