//! In-process store implementation.
//!
//! Backs tests and local runs. Every map lives behind its own `RwLock`;
//! the operations that carry atomicity requirements (`begin_detection`,
//! `replace_segments`, `create_clip`) take the write lock for their whole
//! critical section, so the guarantees match what a transactional backend
//! provides.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use cliprank_models::{
    Clip, ClipSummary, Media, MediaId, MediaSegment, MediaStatus, Page, PageRequest, Transcript,
};

use crate::error::{StoreError, StoreResult};
use crate::repos::{ClipStore, MediaStore, SegmentStore, TranscriptStore};
use crate::sorting::sort_clips_for_listing;

/// In-memory store over `RwLock`-guarded maps.
#[derive(Default)]
pub struct MemoryStore {
    media: RwLock<HashMap<MediaId, Media>>,
    transcripts: RwLock<HashMap<MediaId, Vec<Transcript>>>,
    segments: RwLock<HashMap<MediaId, Vec<MediaSegment>>>,
    clips: RwLock<HashMap<MediaId, Vec<Clip>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn find_media(&self, media_id: &MediaId) -> StoreResult<Option<Media>> {
        Ok(self.media.read().await.get(media_id).cloned())
    }

    async fn save_media(&self, media: &Media) -> StoreResult<()> {
        self.media
            .write()
            .await
            .insert(media.media_id.clone(), media.clone());
        Ok(())
    }

    async fn begin_detection(&self, media_id: &MediaId) -> StoreResult<bool> {
        let mut media = self.media.write().await;
        let entry = media
            .get_mut(media_id)
            .ok_or_else(|| StoreError::not_found(format!("media {}", media_id)))?;

        if entry.status == MediaStatus::Detecting {
            return Ok(false);
        }

        entry.status = MediaStatus::Detecting;
        entry.updated_at = Utc::now();
        Ok(true)
    }

    async fn finish_detection(
        &self,
        media_id: &MediaId,
        status: MediaStatus,
        segment_count: u32,
        error_message: Option<String>,
    ) -> StoreResult<()> {
        let mut media = self.media.write().await;
        let entry = media
            .get_mut(media_id)
            .ok_or_else(|| StoreError::not_found(format!("media {}", media_id)))?;

        entry.status = status;
        entry.segment_count = segment_count;
        entry.error_message = error_message;
        entry.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn find_latest_transcript(&self, media_id: &MediaId) -> StoreResult<Option<Transcript>> {
        Ok(self
            .transcripts
            .read()
            .await
            .get(media_id)
            .and_then(|versions| versions.last().cloned()))
    }

    async fn save_transcript(&self, transcript: &Transcript) -> StoreResult<()> {
        self.transcripts
            .write()
            .await
            .entry(transcript.media_id.clone())
            .or_default()
            .push(transcript.clone());
        Ok(())
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn replace_segments(
        &self,
        media_id: &MediaId,
        segments: Vec<MediaSegment>,
    ) -> StoreResult<()> {
        let count = segments.len();
        self.segments
            .write()
            .await
            .insert(media_id.clone(), segments);

        debug!(media_id = %media_id, count, "Replaced segments");
        Ok(())
    }

    async fn find_segments_for_media(
        &self,
        media_id: &MediaId,
    ) -> StoreResult<Vec<MediaSegment>> {
        Ok(self
            .segments
            .read()
            .await
            .get(media_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ClipStore for MemoryStore {
    async fn find_clip(
        &self,
        media_id: &MediaId,
        start_ms: u64,
        end_ms: u64,
        profile_hash: &str,
    ) -> StoreResult<Option<Clip>> {
        Ok(self.clips.read().await.get(media_id).and_then(|clips| {
            clips
                .iter()
                .find(|c| {
                    c.start_ms == start_ms
                        && c.end_ms == end_ms
                        && c.profile_hash == profile_hash
                })
                .cloned()
        }))
    }

    async fn create_clip(&self, clip: &Clip) -> StoreResult<()> {
        let mut clips = self.clips.write().await;
        let entries = clips.entry(clip.media_id.clone()).or_default();

        let duplicate = entries.iter().any(|c| {
            c.start_ms == clip.start_ms
                && c.end_ms == clip.end_ms
                && c.profile_hash == clip.profile_hash
        });
        if duplicate {
            return Err(StoreError::already_exists(format!(
                "clip {}:{}-{}:{}",
                clip.media_id, clip.start_ms, clip.end_ms, clip.profile_hash
            )));
        }

        entries.push(clip.clone());
        Ok(())
    }

    async fn update_clip(&self, clip: &Clip) -> StoreResult<()> {
        let mut clips = self.clips.write().await;
        let entries = clips
            .get_mut(&clip.media_id)
            .ok_or_else(|| StoreError::not_found(format!("clip {}", clip.clip_id)))?;

        let entry = entries
            .iter_mut()
            .find(|c| c.clip_id == clip.clip_id)
            .ok_or_else(|| StoreError::not_found(format!("clip {}", clip.clip_id)))?;

        *entry = clip.clone();
        Ok(())
    }

    async fn list_clips(
        &self,
        media_id: &MediaId,
        page: &PageRequest,
    ) -> StoreResult<Page<ClipSummary>> {
        let clips = self.clips.read().await;
        let mut all: Vec<Clip> = clips.get(media_id).cloned().unwrap_or_default();
        sort_clips_for_listing(&mut all);

        let total = all.len() as u64;
        let items: Vec<ClipSummary> = all
            .iter()
            .skip(page.offset())
            .take(page.limit())
            .map(ClipSummary::from)
            .collect();

        Ok(Page::new(items, page, total))
    }
}
