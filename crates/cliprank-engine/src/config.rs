//! Engine configuration.
//!
//! All configuration is immutable per call. Defaults here are the tuned
//! production values; callers override them through their own config layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Window duration bounds in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Minimum window duration
    pub min_ms: u64,
    /// Maximum window duration
    pub max_ms: u64,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            min_ms: 10_000,
            max_ms: 60_000,
        }
    }
}

impl WindowBounds {
    /// Clamp a span into the bounds.
    pub fn clamp(&self, span_ms: u64) -> u64 {
        span_ms.clamp(self.min_ms, self.max_ms)
    }

    /// True when a duration lies within the bounds.
    pub fn contains(&self, duration_ms: u64) -> bool {
        duration_ms >= self.min_ms && duration_ms <= self.max_ms
    }
}

/// Configuration for the detection phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Window duration bounds
    pub bounds: WindowBounds,

    /// Max distance an edge may travel to meet a silence boundary
    pub snap_threshold_ms: u64,

    /// Ideal clip duration in seconds for the length bell
    pub target_duration_sec: f64,

    /// Width of the length bell in seconds (floored at 6.0 when scoring)
    pub sigma_sec: f64,

    /// Number of windows a selection run may accept
    pub max_candidates: usize,

    /// Apply speaker-turn heuristics when turn data exists
    pub use_speaker_turns: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            bounds: WindowBounds::default(),
            snap_threshold_ms: 300,
            target_duration_sec: 30.0,
            sigma_sec: 9.0,
            max_candidates: 5,
            use_speaker_turns: true,
        }
    }
}

impl DetectionConfig {
    /// Soft cap on enumerated candidates, bounding the O(S²) sweep on long
    /// transcripts. The factor is a tuned constant; keep it as-is.
    pub fn candidate_cap(&self) -> usize {
        self.max_candidates * 10
    }
}

/// Weights for the recommendation-phase feature score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of speech density
    pub density: f64,
    /// Weight of mean word confidence
    pub confidence: f64,
    /// Weight of the energy term
    pub energy: f64,
    /// Weight of the silence penalty (subtracted)
    pub silence: f64,
    /// Weight of the keyword bonus
    pub keyword: f64,
    /// Weight of the length-fit term
    pub length_fit: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            density: 0.30,
            confidence: 0.20,
            energy: 0.15,
            silence: 0.15,
            keyword: 0.10,
            length_fit: 0.10,
        }
    }
}

/// Configuration for the recommendation phase selector and scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Ideal clip duration in seconds for the length-fit term
    pub target_duration_sec: f64,

    /// Windows below this speech density score zero
    pub min_speech_density: f64,

    /// Windows above this silence penalty score zero
    pub max_silence_penalty: f64,

    /// Boost keyword pool (normalized tokens)
    pub boost_keywords: BTreeSet<String>,

    /// Feature weights
    pub weights: ScoreWeights,

    /// Window duration bounds
    pub bounds: WindowBounds,

    /// Number of windows a selection run may accept
    pub max_candidates: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            target_duration_sec: 30.0,
            min_speech_density: 0.2,
            max_silence_penalty: 0.8,
            boost_keywords: BTreeSet::new(),
            weights: ScoreWeights::default(),
            bounds: WindowBounds::default(),
            max_candidates: 5,
        }
    }
}

/// Clamp a value into [0,1].
pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
