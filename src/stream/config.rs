//! Streaming body configuration.

use crate::buffer::capacity::CapacityMode;
use serde::{Deserialize, Serialize};

/// Limits applied to one streaming body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Most bytes buffered before a chunk handler attaches (default: unbounded).
    pub pending_ceiling: Option<usize>,
    /// Capacity of the buffer used to collect a body as text
    /// (default: growable, 16 KiB steps up to 1000 KiB).
    pub text_capacity: CapacityMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { pending_ceiling: None, text_capacity: CapacityMode::default() }
    }
}

impl StreamConfig {
    /// Bound both pre-attach buffering and text collection to `max` bytes.
    pub fn bounded(max: usize) -> Self {
        Self { pending_ceiling: Some(max), text_capacity: CapacityMode::fixed(max) }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
