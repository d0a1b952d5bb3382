//! Job types for the render queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use cliprank_models::MediaId;

/// Job type string for clip render jobs.
pub const RENDER_CLIP_JOB_TYPE: &str = "render_clip";

/// Unique identifier for an enqueued job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
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

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload for a clip render job.
///
/// The render pipeline is an external consumer; this struct is the wire
/// contract it reads off the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderClipJob {
    /// Clip to render (also the dedup key)
    pub clip_id: String,
    /// Media the clip belongs to
    pub media_id: MediaId,
    /// Start timestamp in milliseconds
    pub start_ms: u64,
    /// End timestamp in milliseconds
    pub end_ms: u64,
    /// Canonical profile hash
    pub profile_hash: String,
    /// Raw render profile
    pub profile: serde_json::Value,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl RenderClipJob {
    /// Create a new render job.
    pub fn new(
        clip_id: impl Into<String>,
        media_id: MediaId,
        start_ms: u64,
        end_ms: u64,
        profile_hash: impl Into<String>,
        profile: serde_json::Value,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            media_id,
            start_ms,
            end_ms,
            profile_hash: profile_hash.into(),
            profile,
            created_at: Utc::now(),
        }
    }

    /// Dedup key: one render per clip id.
    pub fn idempotency_key(&self) -> &str {
        &self.clip_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_generation() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_idempotency_key_is_clip_id() {
        let job = RenderClipJob::new(
            "clip-1",
            MediaId::new(),
            0,
            30_000,
            "",
            serde_json::Value::Null,
        );
        assert_eq!(job.idempotency_key(), "clip-1");
    }
}
