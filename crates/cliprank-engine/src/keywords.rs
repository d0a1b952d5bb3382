//! Boost-keyword pool derivation.
//!
//! The pool seeds the recommendation scorer's keyword bonus. It is built
//! from transcript word frequency (the terms a speaker keeps returning to
//! are what the clip is about) merged with caller overrides.

use std::collections::{BTreeSet, HashMap};

use cliprank_models::Word;

use crate::features::normalize_token;

/// Minimum normalized token length considered a keyword.
const MIN_TOKEN_LEN: usize = 4;

/// Frequent filler tokens that say nothing about the topic.
const STOPWORDS: &[&str] = &[
    "that", "this", "with", "have", "from", "they", "will", "what", "when", "your", "just",
    "like", "about", "because", "there", "their", "would", "could", "should", "going", "really",
    "think", "know", "right", "yeah", "okay", "well", "been", "were", "them", "then", "than",
    "some", "more", "into", "over", "only", "very", "also", "after", "before", "where", "which",
    "while", "these", "those", "dont", "thats", "youre", "gonna", "want", "here",
];

/// Derive the boost-keyword pool from transcript frequency plus caller
/// overrides. At most `cap` frequency-derived tokens are kept; overrides
/// are always included (after normalization and the length filter, since
/// shorter tokens can never match during extraction anyway).
pub fn derive_boost_keywords(words: &[Word], overrides: &[String], cap: usize) -> BTreeSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for word in words {
        let token = normalize_token(&word.text);
        if token.len() < MIN_TOKEN_LEN || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    // Deterministic order: count desc, then token asc.
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut pool: BTreeSet<String> = ranked
        .into_iter()
        .take(cap)
        .map(|(token, _)| token)
        .collect();

    for raw in overrides {
        let token = normalize_token(raw);
        if token.len() >= MIN_TOKEN_LEN {
            pool.insert(token);
        }
    }

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Word::new(*t, i as u64 * 100, (i as u64 + 1) * 100))
            .collect()
    }

    #[test]
    fn test_frequency_ranking() {
        let input = words(&[
            "rocket", "rocket", "rocket", "engine", "engine", "launch",
        ]);
        let pool = derive_boost_keywords(&input, &[], 2);
        assert!(pool.contains("rocket"));
        assert!(pool.contains("engine"));
        assert!(!pool.contains("launch"));
    }

    #[test]
    fn test_stopwords_and_short_tokens_excluded() {
        let input = words(&["that", "that", "that", "the", "orbit"]);
        let pool = derive_boost_keywords(&input, &[], 10);
        assert!(!pool.contains("that"));
        assert!(!pool.contains("the"));
        assert!(pool.contains("orbit"));
    }

    #[test]
    fn test_overrides_merged_and_normalized() {
        let input = words(&["orbit"]);
        let pool = derive_boost_keywords(&input, &["Payload!".to_string(), "ab".to_string()], 5);
        assert!(pool.contains("payload"));
        assert!(!pool.contains("ab"));
    }

    #[test]
    fn test_deterministic_tie_break() {
        let input = words(&["alpha", "beta", "alpha", "beta", "gamma"]);
        let a = derive_boost_keywords(&input, &[], 2);
        let b = derive_boost_keywords(&input, &[], 2);
        assert_eq!(a, b);
        assert!(a.contains("alpha") && a.contains("beta"));
    }
}
