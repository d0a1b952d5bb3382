//! Recommendation-phase feature extraction and scoring.
//!
//! Features come from the words overlapping a window (clipped to its
//! bounds). The weighted combination is caller-tunable; the defaults favor
//! high density and confidence, moderate energy, low silence penalty, a
//! keyword bonus and a symmetric length-fit around the target duration.
//! This scorer is intentionally separate from the detection heuristic.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use cliprank_models::Word;
use serde::{Deserialize, Serialize};

use crate::config::{clamp01, SelectorConfig};

/// Confidence assumed for words the provider left unscored.
const DEFAULT_CONFIDENCE: f64 = 0.75;

/// Words per second at which the pace term saturates.
const PACE_SATURATION_WPS: f64 = 3.5;

/// Per-keyword bonus increment; saturates after four matches.
const KEYWORD_INCREMENT: f64 = 0.25;

/// Extracted features for one window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowFeatures {
    /// Fraction of the window covered by speech, in [0,1]
    pub speech_density: f64,

    /// Mean word confidence, 0 when the window has no words
    pub avg_confidence: f64,

    /// Pace and emphasis term, in [0,1]
    pub energy: f64,

    /// `1 - speech_density`
    pub silence_penalty: f64,

    /// Boost keywords present in the window
    pub matched_keywords: Vec<String>,
}

impl WindowFeatures {
    /// Flatten into a string map for clip metadata.
    pub fn to_meta(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        meta.insert("speech_density".to_string(), format!("{:.4}", self.speech_density));
        meta.insert("avg_confidence".to_string(), format!("{:.4}", self.avg_confidence));
        meta.insert("energy".to_string(), format!("{:.4}", self.energy));
        meta.insert("silence_penalty".to_string(), format!("{:.4}", self.silence_penalty));
        if !self.matched_keywords.is_empty() {
            meta.insert("matched_keywords".to_string(), self.matched_keywords.join(","));
        }
        meta
    }
}

/// Extract features for the window `[start_ms, end_ms)`.
pub fn extract_features(
    start_ms: u64,
    end_ms: u64,
    words: &[Word],
    boost_keywords: &BTreeSet<String>,
) -> WindowFeatures {
    let duration_ms = end_ms.saturating_sub(start_ms);
    if duration_ms == 0 {
        return WindowFeatures {
            speech_density: 0.0,
            avg_confidence: 0.0,
            energy: 0.0,
            silence_penalty: 1.0,
            matched_keywords: Vec::new(),
        };
    }

    let mut overlap_ms: u64 = 0;
    let mut confidence_sum = 0.0;
    let mut word_count: usize = 0;
    let mut exclamatory = 0usize;
    let mut uppercase = 0usize;
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for word in words {
        let clipped_start = word.start_ms.max(start_ms);
        let clipped_end = word.end_ms.min(end_ms);
        if clipped_end <= clipped_start {
            continue;
        }

        overlap_ms += clipped_end - clipped_start;
        confidence_sum += word.confidence.unwrap_or(DEFAULT_CONFIDENCE);
        word_count += 1;

        if word.text.contains('!') {
            exclamatory += 1;
        }
        if is_shouted(&word.text) {
            uppercase += 1;
        }

        let token = normalize_token(&word.text);
        if token.len() >= 4 && boost_keywords.contains(&token) {
            matched.insert(token);
        }
    }

    let duration_sec = duration_ms as f64 / 1000.0;
    let speech_density = clamp01(overlap_ms as f64 / duration_ms as f64);
    let avg_confidence = if word_count > 0 {
        confidence_sum / word_count as f64
    } else {
        0.0
    };

    let pace = word_count as f64 / duration_sec / PACE_SATURATION_WPS;
    let emphasis = (0.05 * exclamatory as f64 + 0.02 * uppercase as f64).min(0.2);
    let energy = clamp01(pace + emphasis);

    WindowFeatures {
        speech_density,
        avg_confidence,
        energy,
        silence_penalty: 1.0 - speech_density,
        matched_keywords: matched.into_iter().collect(),
    }
}

/// Combine features into the recommendation score for a window of
/// `duration_ms`. Windows failing the density/silence gates score zero.
pub fn score_features(
    features: &WindowFeatures,
    duration_ms: u64,
    config: &SelectorConfig,
) -> f64 {
    if features.speech_density < config.min_speech_density {
        return 0.0;
    }
    if features.silence_penalty > config.max_silence_penalty {
        return 0.0;
    }

    let weights = &config.weights;
    let keyword_bonus = (KEYWORD_INCREMENT * features.matched_keywords.len() as f64).min(1.0);
    let length_fit = length_fit(duration_ms, config.target_duration_sec);

    let raw = weights.density * features.speech_density
        + weights.confidence * features.avg_confidence
        + weights.energy * features.energy
        + weights.keyword * keyword_bonus
        + weights.length_fit * length_fit
        - weights.silence * features.silence_penalty;

    clamp01(raw)
}

/// Symmetric length fit around the target duration, in [0,1].
fn length_fit(duration_ms: u64, target_sec: f64) -> f64 {
    if target_sec <= 0.0 {
        return 0.0;
    }
    let duration_sec = duration_ms as f64 / 1000.0;
    clamp01(1.0 - (duration_sec - target_sec).abs() / target_sec)
}

/// Normalize a word to its alnum-only lowercase token.
pub(crate) fn normalize_token(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// All alphabetic characters uppercase, at least two of them.
fn is_shouted(text: &str) -> bool {
    let mut letters = 0;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if c.is_lowercase() {
            return false;
        }
        letters += 1;
    }
    letters >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_words(start_ms: u64, end_ms: u64, word_ms: u64) -> Vec<Word> {
        let mut words = Vec::new();
        let mut t = start_ms;
        let mut i = 0;
        while t + word_ms <= end_ms {
            words.push(Word::new(format!("word{}", i), t, t + word_ms));
            t += word_ms;
            i += 1;
        }
        words
    }

    #[test]
    fn test_full_coverage_density() {
        let words = dense_words(0, 10_000, 500);
        let features = extract_features(0, 10_000, &words, &BTreeSet::new());
        assert!((features.speech_density - 1.0).abs() < 1e-9);
        assert!((features.silence_penalty - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_features() {
        let features = extract_features(0, 10_000, &[], &BTreeSet::new());
        assert_eq!(features.speech_density, 0.0);
        assert_eq!(features.avg_confidence, 0.0);
        assert_eq!(features.silence_penalty, 1.0);
    }

    #[test]
    fn test_default_confidence_applied() {
        let words = vec![
            Word::new("sure", 0, 1000).with_confidence(0.95),
            Word::new("maybe", 1000, 2000),
        ];
        let features = extract_features(0, 2000, &words, &BTreeSet::new());
        assert!((features.avg_confidence - (0.95 + 0.75) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_words_clipped_to_window() {
        // Word straddles the right edge; only the inside half counts.
        let words = vec![Word::new("edge", 9_000, 11_000)];
        let features = extract_features(0, 10_000, &words, &BTreeSet::new());
        assert!((features.speech_density - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_matching_normalized() {
        let pool: BTreeSet<String> = ["rocket".to_string()].into_iter().collect();
        let words = vec![Word::new("Rocket!", 0, 1000)];
        let features = extract_features(0, 1000, &words, &pool);
        assert_eq!(features.matched_keywords, vec!["rocket".to_string()]);
    }

    #[test]
    fn test_short_tokens_never_match() {
        let pool: BTreeSet<String> = ["big".to_string()].into_iter().collect();
        let words = vec![Word::new("big", 0, 1000)];
        let features = extract_features(0, 1000, &words, &pool);
        assert!(features.matched_keywords.is_empty());
    }

    #[test]
    fn test_energy_saturates() {
        // 10 words/sec with exclamations: energy must stay clamped at 1.
        let words: Vec<Word> = (0..100)
            .map(|i| Word::new("GO!", i * 100, (i + 1) * 100))
            .collect();
        let features = extract_features(0, 10_000, &words, &BTreeSet::new());
        assert!(features.energy <= 1.0);
        assert!(features.energy > 0.9);
    }

    #[test]
    fn test_density_gate_zeroes_score() {
        let config = SelectorConfig::default();
        let features = WindowFeatures {
            speech_density: 0.1,
            avg_confidence: 0.9,
            energy: 0.9,
            silence_penalty: 0.9,
            matched_keywords: Vec::new(),
        };
        assert_eq!(score_features(&features, 30_000, &config), 0.0);
    }

    #[test]
    fn test_score_in_unit_interval() {
        let config = SelectorConfig::default();
        let features = WindowFeatures {
            speech_density: 1.0,
            avg_confidence: 1.0,
            energy: 1.0,
            silence_penalty: 0.0,
            matched_keywords: vec!["alpha".into(), "beta".into(), "gamma".into(), "delta".into(), "epsilon".into()],
        };
        let score = score_features(&features, 30_000, &config);
        assert!(score > 0.0);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_length_fit_symmetric() {
        let short = length_fit(20_000, 30.0);
        let long = length_fit(40_000, 30.0);
        assert!((short - long).abs() < 1e-9);
        assert!((length_fit(30_000, 30.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_higher_density_scores_higher() {
        let config = SelectorConfig::default();
        let full = dense_words(0, 30_000, 3000);
        let features_full = extract_features(0, 30_000, &full, &config.boost_keywords);

        let half: Vec<Word> = dense_words(0, 15_000, 3000);
        let features_half = extract_features(0, 30_000, &half, &config.boost_keywords);

        let full_score = score_features(&features_full, 30_000, &config);
        let half_score = score_features(&features_half, 30_000, &config);
        assert!(full_score > half_score);
    }
}
