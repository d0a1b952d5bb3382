//! Media aggregate models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a media item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    /// Generate a new random media ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MediaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Media detection lifecycle status.
///
/// `Detecting` is the explicit marker that serializes detection runs per
/// media: a run is rejected while another one holds the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    /// Media registered, no detection run yet
    #[default]
    Uploaded,
    /// A detection run is in progress
    Detecting,
    /// Detection completed, segments available
    Ready,
    /// Detection failed
    Failed,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Uploaded => "uploaded",
            MediaStatus::Detecting => "detecting",
            MediaStatus::Ready => "ready",
            MediaStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media item owning transcripts, segments and clips.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Media {
    /// Unique media ID
    pub media_id: MediaId,

    /// Display title
    pub title: String,

    /// Known duration in milliseconds, if probed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Detection lifecycle status
    #[serde(default)]
    pub status: MediaStatus,

    /// Number of segments produced by the latest detection run
    #[serde(default)]
    pub segment_count: u32,

    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Media {
    /// Create a new media record.
    pub fn new(media_id: MediaId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            media_id,
            title: title.into(),
            duration_ms: None,
            status: MediaStatus::Uploaded,
            segment_count: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the known duration.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Mark detection as completed.
    pub fn complete_detection(mut self, segment_count: u32) -> Self {
        self.status = MediaStatus::Ready;
        self.segment_count = segment_count;
        self.error_message = None;
        self.updated_at = Utc::now();
        self
    }

    /// Mark detection as failed.
    pub fn fail_detection(mut self, error: impl Into<String>) -> Self {
        self.status = MediaStatus::Failed;
        self.error_message = Some(error.into());
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_id_generation() {
        let id1 = MediaId::new();
        let id2 = MediaId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_media_lifecycle() {
        let media = Media::new(MediaId::new(), "Test Media");
        assert_eq!(media.status, MediaStatus::Uploaded);

        let media = media.complete_detection(4);
        assert_eq!(media.status, MediaStatus::Ready);
        assert_eq!(media.segment_count, 4);

        let media = media.fail_detection("boom");
        assert_eq!(media.status, MediaStatus::Failed);
        assert_eq!(media.error_message.as_deref(), Some("boom"));
    }
}
