//! Detection run service.
//!
//! Drives the detection phase end to end: latest transcript → sentence
//! segmentation → silence snapping → anchored candidate generation →
//! heuristic scoring → greedy selection → wholesale segment replacement.
//! The media aggregate's `Detecting` marker serializes runs per media;
//! the engine itself stays stateless.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use cliprank_engine::{generate_anchored, segment_sentences, select_top, SilenceIndex};
use cliprank_models::{Media, MediaId, MediaSegment, MediaStatus};
use cliprank_store::{MediaStore, SegmentStore, Store, TranscriptStore};

use crate::config::EngineConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::silence::SilenceDetector;

/// Summary of one persisted segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub start_ms: u64,
    pub end_ms: u64,
    pub score: f64,
}

/// Response of a detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionRunResponse {
    pub media_id: MediaId,
    pub segment_count: u32,
    pub segments: Vec<SegmentSummary>,
}

impl DetectionRunResponse {
    fn empty(media_id: MediaId) -> Self {
        Self {
            media_id,
            segment_count: 0,
            segments: Vec::new(),
        }
    }
}

/// Detection run coordinator.
pub struct DetectionService {
    store: Arc<dyn Store>,
    silence: Arc<dyn SilenceDetector>,
    engine: EngineConfig,
}

impl DetectionService {
    /// Create a new detection service.
    pub fn new(
        store: Arc<dyn Store>,
        silence: Arc<dyn SilenceDetector>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            store,
            silence,
            engine,
        }
    }

    /// Run detection for a media item.
    ///
    /// Missing media or an empty transcript yield an empty result, never an
    /// error. A media item already mid-detection is rejected with a
    /// conflict.
    pub async fn run_detection(&self, media_id: &MediaId) -> ApiResult<DetectionRunResponse> {
        let Some(media) = self.store.find_media(media_id).await? else {
            return Ok(DetectionRunResponse::empty(media_id.clone()));
        };

        if !self.store.begin_detection(media_id).await? {
            return Err(ApiError::conflict(
                "A detection run is already in progress for this media",
            ));
        }

        match self.run_inner(&media).await {
            Ok(response) => {
                self.store
                    .finish_detection(media_id, MediaStatus::Ready, response.segment_count, None)
                    .await?;
                crate::metrics::record_detection_run("ok");
                Ok(response)
            }
            Err(e) => {
                crate::metrics::record_detection_run("failed");
                if let Err(finish_err) = self
                    .store
                    .finish_detection(media_id, MediaStatus::Failed, 0, Some(e.to_string()))
                    .await
                {
                    warn!(media_id = %media_id, error = %finish_err, "Failed to record detection failure");
                }
                Err(e)
            }
        }
    }

    async fn run_inner(&self, media: &Media) -> ApiResult<DetectionRunResponse> {
        let media_id = &media.media_id;

        let transcript = self.store.find_latest_transcript(media_id).await?;
        let transcript = match transcript {
            Some(t) if !t.is_empty() => t,
            _ => {
                // No words, nothing to detect; still a wholesale replacement.
                self.store.replace_segments(media_id, Vec::new()).await?;
                info!(media_id = %media_id, "Detection run on empty transcript");
                return Ok(DetectionRunResponse::empty(media_id.clone()));
            }
        };

        let silence_index = match self
            .silence
            .detect(
                media,
                self.engine.noise_db_threshold,
                self.engine.min_silence_duration_sec,
            )
            .await
        {
            Ok(intervals) => SilenceIndex::new(&intervals),
            Err(e) => {
                warn!(media_id = %media_id, error = %e, "Silence detection failed, proceeding unsnapped");
                SilenceIndex::empty()
            }
        };

        let spans = segment_sentences(&transcript.words);
        let turns = (!transcript.speaker_turns.is_empty()).then_some(&transcript.speaker_turns[..]);

        let config = self.engine.detection();
        let candidates = generate_anchored(&spans, &silence_index, turns, &config);
        let selected = select_top(candidates, config.max_candidates);

        let segments: Vec<MediaSegment> = selected
            .iter()
            .map(|sw| {
                let meta = sw
                    .breakdown
                    .as_ref()
                    .map(|b| b.to_meta())
                    .unwrap_or_default();
                MediaSegment::new(
                    media_id.clone(),
                    sw.window.start_ms,
                    sw.window.end_ms,
                    sw.score,
                )
                .with_meta(meta)
            })
            .collect();

        let summaries: Vec<SegmentSummary> = segments
            .iter()
            .map(|s| SegmentSummary {
                start_ms: s.start_ms,
                end_ms: s.end_ms,
                score: s.score,
            })
            .collect();

        let segment_count = segments.len() as u32;
        self.store.replace_segments(media_id, segments).await?;

        info!(
            media_id = %media_id,
            sentences = spans.len(),
            segment_count,
            "Detection run complete"
        );

        Ok(DetectionRunResponse {
            media_id: media_id.clone(),
            segment_count,
            segments: summaries,
        })
    }

    /// Score breakdown for the exact window from the latest run, empty when
    /// the window is not part of it.
    pub async fn explain(
        &self,
        media_id: &MediaId,
        start_ms: u64,
        end_ms: u64,
    ) -> ApiResult<BTreeMap<String, String>> {
        let segments = self.store.find_segments_for_media(media_id).await?;
        Ok(segments
            .into_iter()
            .find(|s| s.start_ms == start_ms && s.end_ms == end_ms)
            .map(|s| s.meta)
            .unwrap_or_default())
    }

    /// Segments from the latest detection run.
    pub async fn list_segments(&self, media_id: &MediaId) -> ApiResult<Vec<MediaSegment>> {
        Ok(self.store.find_segments_for_media(media_id).await?)
    }
}
