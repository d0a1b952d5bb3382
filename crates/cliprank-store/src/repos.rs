//! Store traits the services are written against.
//!
//! Deployment persistence is an external collaborator; these traits are the
//! whole contract. `create_clip` must enforce the
//! (media_id, start_ms, end_ms, profile_hash) unique constraint and fail
//! with `StoreError::AlreadyExists` on violation, which is what makes the
//! idempotent upsert's find-then-update retry safe under concurrency.

use async_trait::async_trait;
use cliprank_models::{
    Clip, ClipSummary, Media, MediaId, MediaSegment, MediaStatus, Page, PageRequest, Transcript,
};

use crate::error::StoreResult;

/// Media aggregate persistence.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Look up a media item.
    async fn find_media(&self, media_id: &MediaId) -> StoreResult<Option<Media>>;

    /// Create or replace a media item.
    async fn save_media(&self, media: &Media) -> StoreResult<()>;

    /// Atomically move a media item into `Detecting` unless a detection run
    /// already holds the marker. Returns false when the marker was taken.
    async fn begin_detection(&self, media_id: &MediaId) -> StoreResult<bool>;

    /// Release the detection marker, recording the outcome.
    async fn finish_detection(
        &self,
        media_id: &MediaId,
        status: MediaStatus,
        segment_count: u32,
        error_message: Option<String>,
    ) -> StoreResult<()>;
}

/// Transcript persistence.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Newest transcript for a media item, if any.
    async fn find_latest_transcript(&self, media_id: &MediaId) -> StoreResult<Option<Transcript>>;

    /// Append a transcript version.
    async fn save_transcript(&self, transcript: &Transcript) -> StoreResult<()>;
}

/// Detection segment persistence.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Atomically replace all segments for a media item (delete-all then
    /// insert-batch). Detection output is never appended.
    async fn replace_segments(
        &self,
        media_id: &MediaId,
        segments: Vec<MediaSegment>,
    ) -> StoreResult<()>;

    /// All segments from the latest detection run.
    async fn find_segments_for_media(&self, media_id: &MediaId)
        -> StoreResult<Vec<MediaSegment>>;
}

/// Clip persistence.
#[async_trait]
pub trait ClipStore: Send + Sync {
    /// Look up a clip by its full dedup key.
    async fn find_clip(
        &self,
        media_id: &MediaId,
        start_ms: u64,
        end_ms: u64,
        profile_hash: &str,
    ) -> StoreResult<Option<Clip>>;

    /// Insert a new clip. Fails with `AlreadyExists` when the
    /// (media_id, start_ms, end_ms, profile_hash) constraint is violated.
    async fn create_clip(&self, clip: &Clip) -> StoreResult<()>;

    /// Update an existing clip (matched by clip_id).
    async fn update_clip(&self, clip: &Clip) -> StoreResult<()>;

    /// Page through a media item's clips, score desc then created_at desc.
    async fn list_clips(
        &self,
        media_id: &MediaId,
        page: &PageRequest,
    ) -> StoreResult<Page<ClipSummary>>;
}

/// Everything the services need, in one object-safe bound.
pub trait Store: MediaStore + TranscriptStore + SegmentStore + ClipStore {}

impl<T: MediaStore + TranscriptStore + SegmentStore + ClipStore> Store for T {}
