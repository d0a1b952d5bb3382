//! Recommendation service with idempotent clip upsert.
//!
//! Expands persisted segments (or tiles the timeline) into windows, scores
//! them from word-level features, picks the top N non-overlapping ones and
//! persists them keyed by (media, window, profile hash). Re-running with
//! unchanged inputs finds the same clips, only ever raises their scores,
//! and never re-enqueues a render.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use cliprank_engine::{
    derive_boost_keywords, extract_features, generate_sliding, score_features, select_top,
    ScoredWindow, SelectorConfig,
};
use cliprank_models::{
    profile_hash, Clip, ClipSummary, MediaId, Page, PageRequest, Transcript,
};
use cliprank_queue::{QueueError, RenderClipJob, RenderQueue, RENDER_CLIP_JOB_TYPE};
use cliprank_store::{ClipStore, MediaStore, SegmentStore, Store, TranscriptStore};

use crate::config::EngineConfig;
use crate::error::ApiResult;

/// Response of a recommendation run.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub media_id: MediaId,
    pub count: usize,
    pub clips: Vec<ClipSummary>,
}

impl RecommendationsResponse {
    fn empty(media_id: MediaId) -> Self {
        Self {
            media_id,
            count: 0,
            clips: Vec::new(),
        }
    }
}

/// Recommendation run coordinator.
pub struct RecommendationService {
    store: Arc<dyn Store>,
    queue: Arc<dyn RenderQueue>,
    engine: EngineConfig,
}

impl RecommendationService {
    /// Create a new recommendation service.
    pub fn new(
        store: Arc<dyn Store>,
        queue: Arc<dyn RenderQueue>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            store,
            queue,
            engine,
        }
    }

    /// Compute and persist the top-N clip recommendations.
    ///
    /// A non-map profile aborts the whole call before any write. A missing
    /// or empty transcript yields an empty result.
    pub async fn compute(
        &self,
        media_id: &MediaId,
        top_n: usize,
        profile_overrides: &Value,
        enqueue_render: bool,
    ) -> ApiResult<RecommendationsResponse> {
        // Fail fast on an unhashable profile; nothing has been written yet.
        let hash = profile_hash(profile_overrides)?;

        let media = self.store.find_media(media_id).await?;
        let transcript = match self.store.find_latest_transcript(media_id).await? {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(RecommendationsResponse::empty(media_id.clone())),
        };

        let segments = self.store.find_segments_for_media(media_id).await?;

        let duration_ms = media
            .and_then(|m| m.duration_ms)
            .unwrap_or_else(|| {
                let segments_end = segments.iter().map(|s| s.end_ms).max().unwrap_or(0);
                segments_end.max(transcript.max_end_ms())
            });

        let config = self.selector_config(&transcript, profile_overrides, top_n);

        let windows = generate_sliding(&segments, duration_ms, &config.bounds);
        let scored: Vec<ScoredWindow> = windows
            .into_iter()
            .filter_map(|window| {
                let features = extract_features(
                    window.start_ms,
                    window.end_ms,
                    &transcript.words,
                    &config.boost_keywords,
                );
                let score = score_features(&features, window.duration_ms(), &config);
                (score > 0.0).then_some(ScoredWindow {
                    window,
                    score,
                    breakdown: None,
                })
            })
            .collect();

        let selected = select_top(scored, top_n);

        let mut clips = Vec::with_capacity(selected.len());
        for candidate in &selected {
            let meta = extract_features(
                candidate.window.start_ms,
                candidate.window.end_ms,
                &transcript.words,
                &config.boost_keywords,
            )
            .to_meta();

            match self
                .upsert_clip(media_id, candidate, &hash, profile_overrides, enqueue_render, meta)
                .await
            {
                Ok(clip) => clips.push(ClipSummary::from(&clip)),
                Err(e) => {
                    // One bad candidate must not abort the batch.
                    warn!(
                        media_id = %media_id,
                        window = %candidate.key(),
                        error = %e,
                        "Skipping candidate after upsert failure"
                    );
                }
            }
        }

        info!(
            media_id = %media_id,
            requested = top_n,
            count = clips.len(),
            profile_hash = %hash,
            "Recommendation run complete"
        );
        crate::metrics::record_recommendation_run("ok");

        Ok(RecommendationsResponse {
            media_id: media_id.clone(),
            count: clips.len(),
            clips,
        })
    }

    /// Page through a media item's persisted clips.
    pub async fn list(
        &self,
        media_id: &MediaId,
        page: PageRequest,
    ) -> ApiResult<Page<ClipSummary>> {
        Ok(self.store.list_clips(media_id, &page).await?)
    }

    /// Build the per-call selector config: engine defaults plus the keyword
    /// pool derived from the transcript and any caller overrides.
    fn selector_config(
        &self,
        transcript: &Transcript,
        profile_overrides: &Value,
        top_n: usize,
    ) -> SelectorConfig {
        let override_keywords: Vec<String> = profile_overrides
            .get("boost_keywords")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut config = self.engine.selector();
        config.boost_keywords = derive_boost_keywords(
            &transcript.words,
            &override_keywords,
            self.engine.keyword_pool_size,
        );
        config.max_candidates = top_n;
        config
    }

    /// Create-or-raise-score upsert for one selected window.
    ///
    /// Lost creation races are retried as find-then-update; the render job
    /// fires only on first-time creation, deduped on the clip id.
    async fn upsert_clip(
        &self,
        media_id: &MediaId,
        candidate: &ScoredWindow,
        hash: &str,
        profile: &Value,
        enqueue_render: bool,
        meta: std::collections::BTreeMap<String, String>,
    ) -> ApiResult<Clip> {
        let start_ms = candidate.window.start_ms;
        let end_ms = candidate.window.end_ms;

        if let Some(mut existing) = self
            .store
            .find_clip(media_id, start_ms, end_ms, hash)
            .await?
        {
            if existing.raise_score(candidate.score) {
                self.store.update_clip(&existing).await?;
            }
            crate::metrics::record_clip_upserted(false);
            return Ok(existing);
        }

        let clip =
            Clip::new(media_id.clone(), start_ms, end_ms, hash, candidate.score).with_meta(meta);

        match self.store.create_clip(&clip).await {
            Ok(()) => {
                crate::metrics::record_clip_upserted(true);
                if enqueue_render {
                    let job = RenderClipJob::new(
                        &clip.clip_id,
                        media_id.clone(),
                        start_ms,
                        end_ms,
                        hash,
                        profile.clone(),
                    );
                    let payload = serde_json::to_value(&job).map_err(QueueError::from)?;
                    self.queue
                        .enqueue_unique(media_id, RENDER_CLIP_JOB_TYPE, &clip.clip_id, payload)
                        .await?;
                    crate::metrics::record_job_enqueued(RENDER_CLIP_JOB_TYPE);
                }
                Ok(clip)
            }
            Err(e) if e.is_already_exists() => {
                // Lost the creation race; the row exists now.
                let mut existing = self
                    .store
                    .find_clip(media_id, start_ms, end_ms, hash)
                    .await?
                    .ok_or(e)?;
                if existing.raise_score(candidate.score) {
                    self.store.update_clip(&existing).await?;
                }
                Ok(existing)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliprank_models::{ClipStatus, Media, MediaSegment, Word};
    use cliprank_queue::MemoryQueue;
    use cliprank_store::{ClipStore, MediaStore, MemoryStore, SegmentStore, TranscriptStore};
    use serde_json::json;

    fn dense_words(until_ms: u64) -> Vec<Word> {
        let mut words = Vec::new();
        let mut t = 0;
        let mut i = 0;
        while t + 2_000 <= until_ms {
            words.push(Word::new(format!("word{}", i), t, t + 2_000).with_confidence(0.9));
            t += 2_000;
            i += 1;
        }
        words
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        queue: Arc<MemoryQueue>,
        service: RecommendationService,
        media_id: MediaId,
    }

    async fn fixture_with_segments() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());

        let media = Media::new(MediaId::new(), "episode").with_duration_ms(90_000);
        let media_id = media.media_id.clone();
        store.save_media(&media).await.unwrap();
        store
            .save_transcript(&Transcript::new(media_id.clone(), dense_words(86_000)))
            .await
            .unwrap();
        store
            .replace_segments(
                &media_id,
                vec![
                    MediaSegment::new(media_id.clone(), 5_000, 25_000, 0.8),
                    MediaSegment::new(media_id.clone(), 40_000, 70_000, 0.7),
                ],
            )
            .await
            .unwrap();

        let service = RecommendationService::new(
            store.clone(),
            queue.clone(),
            crate::config::EngineConfig::default(),
        );

        Fixture {
            store,
            queue,
            service,
            media_id,
        }
    }

    #[tokio::test]
    async fn test_compute_persists_top_n() {
        let f = fixture_with_segments().await;

        let response = f
            .service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();

        assert_eq!(response.count, 2);
        for pair in response.clips.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for clip in &response.clips {
            assert_eq!(clip.status, ClipStatus::Queued);
            assert_eq!(clip.profile_hash, "");
        }
        assert_eq!(f.queue.jobs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_rerun_same_ids_single_enqueue() {
        let f = fixture_with_segments().await;

        let first = f
            .service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();
        let second = f
            .service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();

        let mut first_ids: Vec<String> = first.clips.iter().map(|c| c.id.clone()).collect();
        let mut second_ids: Vec<String> = second.clips.iter().map(|c| c.id.clone()).collect();
        first_ids.sort();
        second_ids.sort();
        assert_eq!(first_ids, second_ids);

        // At most one render job per clip id.
        assert_eq!(f.queue.jobs().await.len(), first.count);
    }

    #[tokio::test]
    async fn test_lower_scoring_rerun_never_decreases() {
        let f = fixture_with_segments().await;

        let first = f
            .service
            .compute(&f.media_id, 5, &json!({}), false)
            .await
            .unwrap();
        let scores_before: Vec<(String, f64)> = first
            .clips
            .iter()
            .map(|c| (c.id.clone(), c.score))
            .collect();

        // A degraded transcript makes every window score lower.
        f.store
            .save_transcript(&Transcript::new(f.media_id.clone(), dense_words(10_000)))
            .await
            .unwrap();
        f.service
            .compute(&f.media_id, 5, &json!({}), false)
            .await
            .unwrap();

        let page = f
            .store
            .list_clips(&f.media_id, &PageRequest::default())
            .await
            .unwrap();
        for (id, score_before) in scores_before {
            let stored = page.items.iter().find(|c| c.id == id).unwrap();
            assert!(stored.score >= score_before);
        }
    }

    #[tokio::test]
    async fn test_higher_scoring_rerun_overwrites() {
        let f = fixture_with_segments().await;

        // Seed an existing clip with a low score for a window the run will
        // also produce.
        f.service
            .compute(&f.media_id, 5, &json!({}), false)
            .await
            .unwrap();
        let page = f
            .store
            .list_clips(&f.media_id, &PageRequest::default())
            .await
            .unwrap();
        let target = &page.items[0];

        let mut clip = f
            .store
            .find_clip(&f.media_id, target.start_ms, target.end_ms, "")
            .await
            .unwrap()
            .unwrap();
        clip.score = 0.01;
        f.store.update_clip(&clip).await.unwrap();

        f.service
            .compute(&f.media_id, 5, &json!({}), false)
            .await
            .unwrap();

        let stored = f
            .store
            .find_clip(&f.media_id, target.start_ms, target.end_ms, "")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.score > 0.01);
    }

    #[tokio::test]
    async fn test_rerun_never_touches_status() {
        let f = fixture_with_segments().await;

        f.service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();

        // Render pipeline finished one clip in the meantime.
        let page = f
            .store
            .list_clips(&f.media_id, &PageRequest::default())
            .await
            .unwrap();
        let mut clip = f
            .store
            .find_clip(&f.media_id, page.items[0].start_ms, page.items[0].end_ms, "")
            .await
            .unwrap()
            .unwrap();
        clip.status = ClipStatus::Completed;
        f.store.update_clip(&clip).await.unwrap();

        f.service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();

        let stored = f
            .store
            .find_clip(&f.media_id, clip.start_ms, clip.end_ms, "")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ClipStatus::Completed);
    }

    #[tokio::test]
    async fn test_missing_transcript_yields_empty() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());
        let media = Media::new(MediaId::new(), "empty");
        let media_id = media.media_id.clone();
        store.save_media(&media).await.unwrap();

        let service = RecommendationService::new(
            store,
            queue.clone(),
            crate::config::EngineConfig::default(),
        );
        let response = service
            .compute(&media_id, 5, &json!({}), true)
            .await
            .unwrap();

        assert_eq!(response.count, 0);
        assert!(queue.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_profile_aborts_before_writes() {
        let f = fixture_with_segments().await;

        let result = f
            .service
            .compute(&f.media_id, 5, &json!([1, 2, 3]), true)
            .await;
        assert!(result.is_err());

        let page = f
            .store
            .list_clips(&f.media_id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(f.queue.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_profiles_make_distinct_clips() {
        let f = fixture_with_segments().await;

        let plain = f
            .service
            .compute(&f.media_id, 5, &json!({}), true)
            .await
            .unwrap();
        let styled = f
            .service
            .compute(&f.media_id, 5, &json!({"subtitles": true}), true)
            .await
            .unwrap();

        assert_eq!(plain.count, styled.count);
        assert_ne!(plain.clips[0].profile_hash, styled.clips[0].profile_hash);
        assert_eq!(styled.clips[0].profile_hash.len(), 40);
        assert_eq!(f.queue.jobs().await.len(), plain.count + styled.count);
    }

    #[tokio::test]
    async fn test_no_segments_falls_back_to_tiling() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());
        let media = Media::new(MediaId::new(), "untiled").with_duration_ms(120_000);
        let media_id = media.media_id.clone();
        store.save_media(&media).await.unwrap();
        store
            .save_transcript(&Transcript::new(media_id.clone(), dense_words(120_000)))
            .await
            .unwrap();

        let service = RecommendationService::new(
            store,
            queue,
            crate::config::EngineConfig::default(),
        );
        let response = service
            .compute(&media_id, 3, &json!({}), false)
            .await
            .unwrap();

        assert!(response.count > 0);
        assert!(response.count <= 3);
    }

    #[tokio::test]
    async fn test_enqueue_disabled() {
        let f = fixture_with_segments().await;

        f.service
            .compute(&f.media_id, 5, &json!({}), false)
            .await
            .unwrap();

        assert!(f.queue.jobs().await.is_empty());
    }
}
