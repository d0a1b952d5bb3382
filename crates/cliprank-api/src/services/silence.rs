//! Acoustic silence detection boundary.
//!
//! The detection algorithm itself lives outside this system; this is the
//! seam it plugs into. Failures never abort a run: the caller logs and
//! proceeds with "no silence data", leaving window edges unsnapped.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use cliprank_models::{Media, SilenceInterval};

/// Error from the external silence detector.
#[derive(Debug, Error)]
#[error("Silence detection failed: {0}")]
pub struct SilenceDetectError(pub String);

/// External acoustic silence detector.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SilenceDetector: Send + Sync {
    /// Detect silence intervals in a media item's audio.
    async fn detect(
        &self,
        media: &Media,
        noise_db_threshold: f64,
        min_silence_duration_sec: f64,
    ) -> Result<Vec<SilenceInterval>, SilenceDetectError>;
}

/// Detector stub for deployments without an acoustic pipeline attached;
/// behaves exactly like a detector that found nothing.
pub struct NoopSilenceDetector;

#[async_trait]
impl SilenceDetector for NoopSilenceDetector {
    async fn detect(
        &self,
        _media: &Media,
        _noise_db_threshold: f64,
        _min_silence_duration_sec: f64,
    ) -> Result<Vec<SilenceInterval>, SilenceDetectError> {
        Ok(Vec::new())
    }
}
