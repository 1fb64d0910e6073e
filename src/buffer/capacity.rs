//! Buffer capacity configuration.

use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};

/// Default growth step (16 KiB).
pub const SMALL_BUFFER_SIZE: usize = 1024 * 16;

/// Default hard ceiling for growable buffers (1000 KiB).
pub const MAX_BUFFER_SIZE: usize = 1024 * 1000;

/// How a buffer is allowed to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CapacityMode {
    /// Never holds more than `max` bytes. Storage doubles on demand, clamped
    /// to `max`.
    Fixed { max: usize },
    /// Grows in `increment`-sized steps up to `ceiling` bytes.
    Growable { increment: usize, ceiling: usize },
}

impl Default for CapacityMode {
    fn default() -> Self {
        CapacityMode::Growable { increment: SMALL_BUFFER_SIZE, ceiling: MAX_BUFFER_SIZE }
    }
}

impl CapacityMode {
    /// Create a fixed-size mode.
    pub fn fixed(max: usize) -> Self {
        CapacityMode::Fixed { max }
    }

    /// Create a growable mode.
    pub fn growable(increment: usize, ceiling: usize) -> Self {
        CapacityMode::Growable { increment, ceiling }
    }

    /// The most bytes a buffer in this mode may ever hold.
    pub fn limit(&self) -> usize {
        match *self {
            CapacityMode::Fixed { max } => max,
            CapacityMode::Growable { ceiling, .. } => ceiling,
        }
    }

    /// Reject configurations that could never accept a byte.
    pub fn validate(&self) -> Result<(), NetError> {
        match *self {
            CapacityMode::Fixed { .. } => Ok(()),
            CapacityMode::Growable { increment, ceiling } => {
                if increment == 0 || ceiling < increment {
                    Err(NetError::InvalidCapacity)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Storage capacity needed to hold `required` bytes.
    ///
    /// Growable modes round up to the next `increment` step, fixed modes to
    /// the next power of two. Fails once `required` exceeds the mode's limit.
    pub(crate) fn capacity_for(&self, required: usize) -> Result<usize, NetError> {
        self.validate()?;
        let limit = self.limit();
        if required > limit {
            return Err(NetError::CapacityExceeded { requested: required, limit });
        }
        match *self {
            CapacityMode::Fixed { max } => {
                Ok(required.checked_next_power_of_two().unwrap_or(max).min(max))
            }
            CapacityMode::Growable { increment, .. } => {
                let steps = required.div_ceil(increment).max(1);
                Ok(steps.saturating_mul(increment).min(limit))
            }
        }
    }
}
