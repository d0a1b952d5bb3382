//! Recommendation handlers.
//!
//! This module provides endpoints for:
//! - Computing and persisting the top-N clip recommendations
//! - Listing persisted clips (score desc, newest first)
//! - Explaining the detection score of an exact window

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use cliprank_models::{ClipSummary, MediaId, Page, PageRequest};

use crate::error::{ApiError, ApiResult};
use crate::services::recommendation::RecommendationsResponse;
use crate::state::AppState;

fn default_top_n() -> usize {
    5
}

fn default_enqueue_render() -> bool {
    true
}

/// Request to compute recommendations.
#[derive(Debug, Deserialize, Validate)]
pub struct ComputeRecommendationsRequest {
    /// Number of clips to keep
    #[serde(default = "default_top_n")]
    #[validate(range(min = 1, max = 50))]
    pub top_n: usize,

    /// Render profile overrides (arbitrary map, hashed canonically)
    #[serde(default)]
    pub profile_overrides: Value,

    /// Enqueue render jobs for newly created clips
    #[serde(default = "default_enqueue_render")]
    pub enqueue_render: bool,
}

/// Compute and persist clip recommendations.
///
/// POST /api/media/:media_id/recommendations
pub async fn compute_recommendations(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<ComputeRecommendationsRequest>,
) -> ApiResult<Json<RecommendationsResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let media_id = MediaId::from_string(media_id);
    let response = state
        .recommendation
        .compute(
            &media_id,
            request.top_n,
            &request.profile_overrides,
            request.enqueue_render,
        )
        .await?;

    Ok(Json(response))
}

/// List persisted recommendations.
///
/// GET /api/media/:media_id/recommendations?page=N&per_page=M
pub async fn list_recommendations(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Page<ClipSummary>>> {
    let media_id = MediaId::from_string(media_id);
    let page = state.recommendation.list(&media_id, page).await?;
    Ok(Json(page))
}

/// Query for the explain endpoint.
#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Response of the explain endpoint.
#[derive(Serialize)]
pub struct ExplainResponse {
    pub media_id: MediaId,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Score component breakdown, empty when the window is not part of the
    /// latest detection run
    pub breakdown: BTreeMap<String, String>,
}

/// Explain the detection score of an exact window.
///
/// GET /api/media/:media_id/explain?start_ms=..&end_ms=..
pub async fn explain_window(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Query(query): Query<ExplainQuery>,
) -> ApiResult<Json<ExplainResponse>> {
    let media_id = MediaId::from_string(media_id);
    let breakdown = state
        .detection
        .explain(&media_id, query.start_ms, query.end_ms)
        .await?;

    Ok(Json(ExplainResponse {
        media_id,
        start_ms: query.start_ms,
        end_ms: query.end_ms,
        breakdown,
    }))
}
