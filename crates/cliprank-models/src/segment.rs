//! Persisted detection segments.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::MediaId;

/// Key identifying a window inside a run, `"{start_ms}-{end_ms}"`.
///
/// Used both for score-breakdown lookups and render-job dedup suffixes.
pub fn window_key(start_ms: u64, end_ms: u64) -> String {
    format!("{}-{}", start_ms, end_ms)
}

/// A detection-phase segment persisted for a media item.
///
/// Segments are replaced wholesale on every detection run (delete-all then
/// insert-batch), never appended. `meta` carries the scorer's component
/// breakdown for the explain query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaSegment {
    /// Media this segment belongs to
    pub media_id: MediaId,

    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,

    /// Detection score in [0,1]
    pub score: f64,

    /// Score component breakdown and other run metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    /// When the segment was produced
    pub created_at: DateTime<Utc>,
}

impl MediaSegment {
    /// Create a new segment.
    pub fn new(media_id: MediaId, start_ms: u64, end_ms: u64, score: f64) -> Self {
        Self {
            media_id,
            start_ms,
            end_ms,
            score,
            meta: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Attach run metadata.
    pub fn with_meta(mut self, meta: BTreeMap<String, String>) -> Self {
        self.meta = meta;
        self
    }

    /// Duration of this segment in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Window key for breakdown lookups.
    pub fn key(&self) -> String {
        window_key(self.start_ms, self.end_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_key() {
        assert_eq!(window_key(15000, 42000), "15000-42000");
    }

    #[test]
    fn test_segment_key_matches_window_key() {
        let segment = MediaSegment::new(MediaId::new(), 1000, 9000, 0.5);
        assert_eq!(segment.key(), "1000-9000");
        assert_eq!(segment.duration_ms(), 8000);
    }
}
