//! API routes.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::media::{create_media, get_media, list_segments, put_transcript, run_detection};
use crate::handlers::recommendations::{
    compute_recommendations, explain_window, list_recommendations,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let media_routes = Router::new()
        // Media registration and lookup
        .route("/media", post(create_media))
        .route("/media/:media_id", get(get_media))
        // Transcript ingestion (normalized provider output)
        .route("/media/:media_id/transcript", put(put_transcript))
        // Detection phase
        .route("/media/:media_id/detect", post(run_detection))
        .route("/media/:media_id/segments", get(list_segments))
        // Recommendation phase
        .route("/media/:media_id/recommendations", post(compute_recommendations))
        .route("/media/:media_id/recommendations", get(list_recommendations))
        .route("/media/:media_id/explain", get(explain_window));

    // Create rate limiter for API routes
    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = media_routes.layer(middleware::from_fn_with_state(
        rate_limiter,
        rate_limit_middleware,
    ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Request body size limit to prevent oversized transcript uploads
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
