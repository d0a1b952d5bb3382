//! Media management handlers.
//!
//! This module provides endpoints for:
//! - Registering media items
//! - Ingesting normalized transcripts (the word-list contract with
//!   transcription providers)
//! - Triggering detection runs and reading their segments

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use cliprank_models::{Media, MediaId, MediaSegment, SpeakerTurn, Transcript, Word};
use cliprank_store::{MediaStore, TranscriptStore};

use crate::error::{ApiError, ApiResult};
use crate::services::detection::DetectionRunResponse;
use crate::state::AppState;

/// Request to register a media item.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMediaRequest {
    /// Display title
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Known duration in milliseconds, if probed
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// Response from registering a media item.
#[derive(Serialize)]
pub struct CreateMediaResponse {
    pub media: Media,
}

/// Register a media item.
///
/// POST /api/media
pub async fn create_media(
    State(state): State<AppState>,
    Json(request): Json<CreateMediaRequest>,
) -> ApiResult<Json<CreateMediaResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut media = Media::new(MediaId::new(), request.title.trim());
    if let Some(duration_ms) = request.duration_ms {
        media = media.with_duration_ms(duration_ms);
    }

    state.store.save_media(&media).await?;

    info!(media_id = %media.media_id, title = %media.title, "Registered media");

    Ok(Json(CreateMediaResponse { media }))
}

/// Fetch a media item.
///
/// GET /api/media/:media_id
pub async fn get_media(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<Media>> {
    let media_id = MediaId::from_string(media_id);
    let media = state
        .store
        .find_media(&media_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;

    Ok(Json(media))
}

/// Request to store a transcript.
#[derive(Debug, Deserialize, Validate)]
pub struct PutTranscriptRequest {
    /// Normalized word list, ordered by start time
    #[validate(length(max = 200_000))]
    pub words: Vec<Word>,

    /// Speaker turns from diarization, if available
    #[serde(default)]
    pub speaker_turns: Vec<SpeakerTurn>,

    /// Language code, if detected
    #[serde(default)]
    pub language: Option<String>,
}

/// Response from storing a transcript.
#[derive(Serialize)]
pub struct PutTranscriptResponse {
    pub media_id: MediaId,
    pub word_count: usize,
    pub speaker_turn_count: usize,
}

/// Store a transcript version for a media item.
///
/// PUT /api/media/:media_id/transcript
pub async fn put_transcript(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<PutTranscriptRequest>,
) -> ApiResult<Json<PutTranscriptResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let media_id = MediaId::from_string(media_id);
    state
        .store
        .find_media(&media_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;

    let word_count = request.words.len();
    let speaker_turn_count = request.speaker_turns.len();

    let mut transcript = Transcript::new(media_id.clone(), request.words)
        .with_speaker_turns(request.speaker_turns);
    transcript.language = request.language;

    state.store.save_transcript(&transcript).await?;

    info!(
        media_id = %media_id,
        word_count,
        speaker_turn_count,
        "Stored transcript"
    );

    Ok(Json(PutTranscriptResponse {
        media_id,
        word_count,
        speaker_turn_count,
    }))
}

/// Run detection for a media item.
///
/// POST /api/media/:media_id/detect
pub async fn run_detection(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<DetectionRunResponse>> {
    let media_id = MediaId::from_string(media_id);
    let response = state.detection.run_detection(&media_id).await?;
    Ok(Json(response))
}

/// Segments from the latest detection run.
#[derive(Serialize)]
pub struct ListSegmentsResponse {
    pub media_id: MediaId,
    pub count: usize,
    pub segments: Vec<MediaSegment>,
}

/// List the latest detection segments.
///
/// GET /api/media/:media_id/segments
pub async fn list_segments(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<ListSegmentsResponse>> {
    let media_id = MediaId::from_string(media_id);
    let segments = state.detection.list_segments(&media_id).await?;

    Ok(Json(ListSegmentsResponse {
        media_id,
        count: segments.len(),
        segments,
    }))
}
