//! Application state.

use std::sync::Arc;

use cliprank_queue::{RedisQueue, RenderQueue};
use cliprank_store::{MemoryStore, Store};

use crate::config::ApiConfig;
use crate::services::{DetectionService, NoopSilenceDetector, RecommendationService, SilenceDetector};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn Store>,
    pub queue: Arc<dyn RenderQueue>,
    pub detection: Arc<DetectionService>,
    pub recommendation: Arc<RecommendationService>,
}

impl AppState {
    /// Create application state for the default deployment: in-process
    /// store, Redis render queue, no acoustic pipeline attached.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let queue: Arc<dyn RenderQueue> = Arc::new(RedisQueue::from_env()?);
        let silence: Arc<dyn SilenceDetector> = Arc::new(NoopSilenceDetector);

        Ok(Self::with_parts(config, store, queue, silence))
    }

    /// Wire state from explicit collaborators.
    pub fn with_parts(
        config: ApiConfig,
        store: Arc<dyn Store>,
        queue: Arc<dyn RenderQueue>,
        silence: Arc<dyn SilenceDetector>,
    ) -> Self {
        let detection = Arc::new(DetectionService::new(
            Arc::clone(&store),
            silence,
            config.engine.clone(),
        ));
        let recommendation = Arc::new(RecommendationService::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            config.engine.clone(),
        ));

        Self {
            config,
            store,
            queue,
            detection,
            recommendation,
        }
    }
}
