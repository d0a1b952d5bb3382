//! Detection-phase heuristic scorer.
//!
//! Scores a sentence-anchored window from its duration, text shape and
//! optional speaker-turn structure. The constants are tuned against
//! production clip engagement and are load-bearing: identical inputs must
//! produce bit-identical scores across runs and hosts, so everything here
//! is plain f64 arithmetic with a fixed evaluation order.

use std::collections::BTreeMap;

use cliprank_models::SpeakerTurn;
use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;

/// Opening words that hook a viewer in the first seconds.
const HOOK_WORDS: &[&str] = &[
    "here's", "listen", "crazy", "secret", "tip", "watch", "big", "why", "how", "mistake", "best",
    "warning", "truth",
];

/// Markers that a window lands on a conclusion or payoff.
const PAYOFF_MARKERS: &[&str] = &[
    "so",
    "therefore",
    "that's why",
    "result",
    "in short",
    "ultimately",
    "the key is",
    "summary",
    "bottom line",
];

/// Edge distance to a speaker change under which a proportional bonus
/// applies.
const NEAR_BOUNDARY_MS: u64 = 900;

/// Edge distance beyond which a non-neat edge is penalized.
const FAR_BOUNDARY_MS: u64 = 1600;

/// Scorer input for one window.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicInput<'a> {
    /// Window start in milliseconds
    pub start_ms: u64,
    /// Window end in milliseconds
    pub end_ms: u64,
    /// Space-joined text of the covered sentences
    pub text: &'a str,
    /// Speaker turns, when diarization ran
    pub turns: Option<&'a [SpeakerTurn]>,
}

/// Component breakdown of a heuristic score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Cauchy length bell, floored at 0.15
    pub length_score: f64,
    /// Whole-word hook match
    pub has_hook: bool,
    /// Whole-word payoff match
    pub has_payoff: bool,
    /// Text boundary bonus
    pub boundary_bonus: f64,
    /// Proportional edge-proximity bonus from speaker changes
    pub speaker_boundary_bonus: f64,
    /// Bonus for a healthy number of turns inside the window
    pub speaker_turn_bonus: f64,
    /// Penalties for mid-turn edges and degenerate turn counts
    pub speaker_mid_penalty: f64,
    /// Final clamped score
    pub overall: f64,
}

impl ScoreBreakdown {
    /// Flatten into the string map persisted for the explain query.
    pub fn to_meta(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();
        meta.insert("length_score".to_string(), format!("{:.4}", self.length_score));
        meta.insert("has_hook".to_string(), self.has_hook.to_string());
        meta.insert("has_payoff".to_string(), self.has_payoff.to_string());
        meta.insert("boundary_bonus".to_string(), format!("{:.4}", self.boundary_bonus));
        meta.insert(
            "speaker_boundary_bonus".to_string(),
            format!("{:.4}", self.speaker_boundary_bonus),
        );
        meta.insert(
            "speaker_turn_bonus".to_string(),
            format!("{:.4}", self.speaker_turn_bonus),
        );
        meta.insert(
            "speaker_mid_penalty".to_string(),
            format!("{:.4}", self.speaker_mid_penalty),
        );
        meta.insert("overall".to_string(), format!("{:.4}", self.overall));
        meta
    }
}

/// Score a window with the detection heuristic.
pub fn score_window(input: HeuristicInput<'_>, config: &DetectionConfig) -> ScoreBreakdown {
    let duration_sec = input.end_ms.saturating_sub(input.start_ms) as f64 / 1000.0;

    let sigma = config.sigma_sec.max(6.0);
    let deviation = (duration_sec - config.target_duration_sec) / sigma;
    let length_score = (1.0 / (1.0 + deviation * deviation)).max(0.15);

    let tokens = tokenize(input.text);
    let has_hook = HOOK_WORDS.iter().any(|m| contains_marker(&tokens, m));
    let has_payoff = PAYOFF_MARKERS.iter().any(|m| contains_marker(&tokens, m));

    let ends_neat = ends_terminal(input.text);
    let starts_neat = starts_alnum(input.text);
    let boundary_bonus =
        0.05 + if ends_neat { 0.06 } else { 0.0 } + if starts_neat { 0.04 } else { 0.0 };

    let (speaker_boundary_bonus, speaker_turn_bonus, speaker_mid_penalty) =
        match input.turns.filter(|t| config.use_speaker_turns && !t.is_empty()) {
            Some(turns) => speaker_adjustments(input, turns, starts_neat, ends_neat),
            None => (0.0, 0.0, 0.0),
        };

    let raw = 0.6 * length_score
        + if has_hook { 0.12 } else { 0.0 }
        + if has_payoff { 0.12 } else { 0.0 }
        + boundary_bonus
        + speaker_boundary_bonus
        + speaker_turn_bonus
        - speaker_mid_penalty;

    ScoreBreakdown {
        length_score,
        has_hook,
        has_payoff,
        boundary_bonus,
        speaker_boundary_bonus,
        speaker_turn_bonus,
        speaker_mid_penalty,
        overall: raw.clamp(0.05, 1.0),
    }
}

/// Speaker-turn adjustments: (boundary bonus, turn-count bonus, penalties).
fn speaker_adjustments(
    input: HeuristicInput<'_>,
    turns: &[SpeakerTurn],
    starts_neat: bool,
    ends_neat: bool,
) -> (f64, f64, f64) {
    let mut boundaries: Vec<u64> = turns
        .iter()
        .flat_map(|t| [t.start_ms, t.end_ms])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut boundary_bonus = 0.0;
    let mut edge_penalty: f64 = 0.0;

    for (edge, neat) in [(input.start_ms, starts_neat), (input.end_ms, ends_neat)] {
        let distance = boundaries
            .iter()
            .map(|b| b.abs_diff(edge))
            .min()
            .unwrap_or(u64::MAX);

        if distance <= NEAR_BOUNDARY_MS {
            boundary_bonus += 0.06 * (1.0 - distance as f64 / NEAR_BOUNDARY_MS as f64);
        } else if distance > FAR_BOUNDARY_MS && !neat {
            edge_penalty += 0.04;
        }
    }
    let edge_penalty = edge_penalty.min(0.08);

    let turns_inside = turns
        .iter()
        .filter(|t| t.start_ms < input.end_ms && t.end_ms > input.start_ms)
        .count();

    let mut turn_bonus = 0.0;
    let mut count_penalty = 0.0;
    match turns_inside {
        0 => count_penalty += 0.08,
        2..=8 => turn_bonus += 0.06,
        n if n > 10 => count_penalty += 0.04,
        _ => {}
    }

    (boundary_bonus, turn_bonus, edge_penalty + count_penalty)
}

/// Lowercased tokens keeping in-word apostrophes, so contractions like
/// "here's" survive whole-word matching.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .flat_map(|c| c.to_lowercase())
                .collect::<String>()
        })
        .map(|t| t.trim_matches('\'').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whole-word match of a (possibly multi-word) marker.
fn contains_marker(tokens: &[String], marker: &str) -> bool {
    let marker_tokens: Vec<&str> = marker.split_whitespace().collect();
    if marker_tokens.is_empty() || marker_tokens.len() > tokens.len() {
        return false;
    }

    tokens
        .windows(marker_tokens.len())
        .any(|run| run.iter().zip(&marker_tokens).all(|(t, m)| t == m))
}

fn ends_terminal(text: &str) -> bool {
    matches!(text.trim_end().chars().last(), Some('.' | '!' | '?'))
}

fn starts_alnum(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some(c) if c.is_alphanumeric())
}
