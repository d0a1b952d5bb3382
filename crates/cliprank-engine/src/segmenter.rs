//! Sentence segmentation over transcript words.
//!
//! The rule is deliberately coarse, not grammatical: it controls how fine
//! the downstream window enumeration gets. A sentence closes once the
//! buffer holds at least four words and the current word ends with terminal
//! punctuation; whatever remains at end-of-input is flushed regardless of
//! size. Changing either condition changes every detection result, so the
//! rule is preserved exactly.

use cliprank_models::Word;
use serde::{Deserialize, Serialize};

/// Minimum buffered words before terminal punctuation may close a sentence.
const MIN_SENTENCE_WORDS: usize = 4;

/// A sentence span derived from consecutive words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSpan {
    /// Start of the first word in milliseconds
    pub start_ms: u64,

    /// End of the last word in milliseconds
    pub end_ms: u64,

    /// Space-joined word text
    pub text: String,
}

impl SentenceSpan {
    /// Duration of this sentence in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// True when a word's text ends a sentence.
fn ends_sentence(text: &str) -> bool {
    matches!(text.trim_end().chars().last(), Some('.' | '!' | '?'))
}

/// Group words into sentence spans.
///
/// Non-empty input always yields non-empty output.
pub fn segment_sentences(words: &[Word]) -> Vec<SentenceSpan> {
    let mut sentences = Vec::new();
    let mut buffer: Vec<&Word> = Vec::new();

    for word in words {
        buffer.push(word);

        if buffer.len() >= MIN_SENTENCE_WORDS && ends_sentence(&word.text) {
            sentences.push(flush(&buffer));
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        sentences.push(flush(&buffer));
    }

    sentences
}

fn flush(buffer: &[&Word]) -> SentenceSpan {
    // Words are ordered by start_ms; take min/max defensively anyway in case
    // the provider emitted overlapping timings.
    let start_ms = buffer.iter().map(|w| w.start_ms).min().unwrap_or(0);
    let end_ms = buffer.iter().map(|w| w.end_ms).max().unwrap_or(start_ms);
    let text = buffer
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    SentenceSpan {
        start_ms,
        end_ms,
        text,
    }
}
