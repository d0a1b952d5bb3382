//! Transcript models.
//!
//! Transcription providers are external; only their normalized word-list
//! output crosses into this system. Words arrive ordered by `start_ms`, but
//! consumers tolerate gaps and overlap defensively.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::MediaId;

/// A single transcribed word with millisecond timing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Word {
    /// Word text as emitted by the provider (may carry punctuation)
    pub text: String,

    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,

    /// Provider confidence in [0,1], if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
            confidence: None,
        }
    }

    /// Set the provider confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Duration of this word in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// A speaker turn from diarization, when available.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpeakerTurn {
    /// Speaker label (provider-specific, e.g. "A", "spk_0")
    pub speaker: String,

    /// Start timestamp in milliseconds
    pub start_ms: u64,

    /// End timestamp in milliseconds
    pub end_ms: u64,
}

/// A normalized transcript owned by a media item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Media this transcript belongs to
    pub media_id: MediaId,

    /// Word list ordered by start time
    pub words: Vec<Word>,

    /// Speaker turns, when diarization ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub speaker_turns: Vec<SpeakerTurn>,

    /// Language code, if detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// When the transcript was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new transcript.
    pub fn new(media_id: MediaId, words: Vec<Word>) -> Self {
        Self {
            media_id,
            words,
            speaker_turns: Vec::new(),
            language: None,
            fetched_at: Utc::now(),
        }
    }

    /// Attach speaker turns.
    pub fn with_speaker_turns(mut self, turns: Vec<SpeakerTurn>) -> Self {
        self.speaker_turns = turns;
        self
    }

    /// True when the transcript carries no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Largest end timestamp across all words, 0 when empty.
    pub fn max_end_ms(&self) -> u64 {
        self.words.iter().map(|w| w.end_ms).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_duration() {
        let word = Word::new("hello", 1000, 1450);
        assert_eq!(word.duration_ms(), 450);
    }

    #[test]
    fn test_word_duration_inverted_is_zero() {
        let word = Word::new("glitch", 2000, 1500);
        assert_eq!(word.duration_ms(), 0);
    }

    #[test]
    fn test_transcript_max_end() {
        let transcript = Transcript::new(
            MediaId::new(),
            vec![Word::new("a", 0, 300), Word::new("b", 300, 900)],
        );
        assert_eq!(transcript.max_end_ms(), 900);
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new(MediaId::new(), Vec::new());
        assert!(transcript.is_empty());
        assert_eq!(transcript.max_end_ms(), 0);
    }
}
