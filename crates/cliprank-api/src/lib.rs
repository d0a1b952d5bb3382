//! Axum HTTP API server.
//!
//! This crate provides:
//! - REST endpoints for media, transcripts, detection and recommendations
//! - The detection and recommendation services wiring the engine to the
//!   store and render queue
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, EngineConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{DetectionService, RecommendationService};
pub use state::AppState;
