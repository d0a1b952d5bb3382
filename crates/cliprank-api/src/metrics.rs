//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "cliprank_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cliprank_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "cliprank_http_requests_in_flight";

    // Engine metrics
    pub const DETECTION_RUNS_TOTAL: &str = "cliprank_detection_runs_total";
    pub const RECOMMENDATION_RUNS_TOTAL: &str = "cliprank_recommendation_runs_total";
    pub const CLIPS_UPSERTED_TOTAL: &str = "cliprank_clips_upserted_total";

    // Queue metrics
    pub const JOBS_ENQUEUED_TOTAL: &str = "cliprank_jobs_enqueued_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "cliprank_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a detection run.
pub fn record_detection_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::DETECTION_RUNS_TOTAL, &labels).increment(1);
}

/// Record a recommendation run.
pub fn record_recommendation_run(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::RECOMMENDATION_RUNS_TOTAL, &labels).increment(1);
}

/// Record a clip upsert.
pub fn record_clip_upserted(created: bool) {
    let labels = [(
        "kind",
        if created { "created" } else { "updated" }.to_string(),
    )];
    counter!(names::CLIPS_UPSERTED_TOTAL, &labels).increment(1);
}

/// Record a job enqueued.
pub fn record_job_enqueued(job_type: &str) {
    let labels = [("type", job_type.to_string())];
    counter!(names::JOBS_ENQUEUED_TOTAL, &labels).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":id");
    // Normalize media IDs (alphanumeric strings after /media/)
    let path = regex_lite::Regex::new(r"/media/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/media/:media_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
