//! Candidate window types.

use cliprank_models::window_key;
use serde::{Deserialize, Serialize};

use crate::heuristic::ScoreBreakdown;

/// An ephemeral candidate clip window.
///
/// Detection-phase windows carry the inclusive sentence index range they
/// cover; recommendation-phase windows carry only the time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,

    /// Inclusive sentence index range (detection phase only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentences: Option<(usize, usize)>,
}

impl Window {
    /// Create a time-range window.
    pub fn span(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms,
            sentences: None,
        }
    }

    /// Create a sentence-anchored window.
    pub fn anchored(start_ms: u64, end_ms: u64, first: usize, last: usize) -> Self {
        Self {
            start_ms,
            end_ms,
            sentences: Some((first, last)),
        }
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Window key, `"{start_ms}-{end_ms}"`.
    pub fn key(&self) -> String {
        window_key(self.start_ms, self.end_ms)
    }
}

/// A window with its score and optional component breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredWindow {
    /// The candidate window
    pub window: Window,

    /// Score in [0,1], higher strictly better
    pub score: f64,

    /// Component breakdown (detection-phase heuristic only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl ScoredWindow {
    /// Window key, `"{start_ms}-{end_ms}"`.
    pub fn key(&self) -> String {
        self.window.key()
    }
}
