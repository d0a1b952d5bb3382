//! Persisted recommendation clips.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MediaId;

/// Render lifecycle status of a clip.
///
/// Owned by the external render pipeline; the recommendation engine only
/// ever sets the initial `Queued` and never touches it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    /// Waiting for the render pipeline
    #[default]
    Queued,
    /// Render in progress
    Rendering,
    /// Render completed
    Completed,
    /// Render failed
    Failed,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Queued => "queued",
            ClipStatus::Rendering => "rendering",
            ClipStatus::Completed => "completed",
            ClipStatus::Failed => "failed",
        }
    }
}

/// A recommendation-phase clip persisted for a media item.
///
/// Unique on (media_id, start_ms, end_ms, profile_hash). Created once per
/// window+profile; the stored score only ever increases on re-runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Unique clip ID
    pub clip_id: String,

    /// Media this clip belongs to
    pub media_id: MediaId,

    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,

    /// Canonical hash of the render profile, "" for the empty profile
    pub profile_hash: String,

    /// Recommendation score in [0,1]
    pub score: f64,

    /// Render lifecycle status
    #[serde(default)]
    pub status: ClipStatus,

    /// Feature metadata from the scoring run
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Clip {
    /// Create a new clip in `Queued` state.
    pub fn new(
        media_id: MediaId,
        start_ms: u64,
        end_ms: u64,
        profile_hash: impl Into<String>,
        score: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            clip_id: Uuid::new_v4().to_string(),
            media_id,
            start_ms,
            end_ms,
            profile_hash: profile_hash.into(),
            score,
            status: ClipStatus::Queued,
            meta: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach scoring metadata.
    pub fn with_meta(mut self, meta: BTreeMap<String, String>) -> Self {
        self.meta = meta;
        self
    }

    /// Duration of this clip in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Raise the stored score to `max(old, new)`. Returns true when the
    /// score actually changed. Status is never touched here.
    pub fn raise_score(&mut self, new_score: f64) -> bool {
        if new_score > self.score {
            self.score = new_score;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }
}

/// Summary of a clip for list views and recommendation responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipSummary {
    pub id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub score: f64,
    pub status: ClipStatus,
    pub profile_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Clip> for ClipSummary {
    fn from(clip: &Clip) -> Self {
        Self {
            id: clip.clip_id.clone(),
            start_ms: clip.start_ms,
            end_ms: clip.end_ms,
            score: clip.score,
            status: clip.status,
            profile_hash: clip.profile_hash.clone(),
            created_at: clip.created_at,
        }
    }
}
