//! Acoustic silence models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A silence interval reported by the external acoustic detector.
///
/// Intervals are read-only input; the detector is the source of truth.
/// A valid interval has `end_ms > start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SilenceInterval {
    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,
}

impl SilenceInterval {
    /// Create a new silence interval.
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Duration of this interval in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// True when `end_ms > start_ms`.
    pub fn is_valid(&self) -> bool {
        self.end_ms > self.start_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_validity() {
        assert!(SilenceInterval::new(100, 400).is_valid());
        assert!(!SilenceInterval::new(400, 400).is_valid());
        assert!(!SilenceInterval::new(500, 400).is_valid());
    }

    #[test]
    fn test_interval_duration() {
        assert_eq!(SilenceInterval::new(1000, 1750).duration_ms(), 750);
    }
}
