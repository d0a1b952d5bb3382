//! Candidate window generation.
//!
//! Two strategies, one per phase:
//! - [`generate_anchored`] enumerates sentence-pair windows for detection,
//!   bounded by an early-exit on window growth and a soft candidate cap.
//! - [`generate_sliding`] expands persisted segments (or tiles the whole
//!   timeline) into fixed-bound windows for recommendation.

use std::collections::BTreeSet;

use cliprank_models::{MediaSegment, SpeakerTurn};
use tracing::debug;

use crate::config::{DetectionConfig, WindowBounds};
use crate::heuristic::{score_window, HeuristicInput};
use crate::segmenter::SentenceSpan;
use crate::snap::SilenceIndex;
use crate::window::{ScoredWindow, Window};

/// Offset subtracted from the max duration to derive the sub-window step
/// for oversized segments. Tuned constant; keep as-is.
const OVERSIZE_STEP_OFFSET_MS: u64 = 5_000;

/// Enumerate, snap and score sentence-anchored windows.
///
/// For every sentence-index pair `i <= j` the raw span is checked against
/// the duration bounds: too-short spans are skipped, and the inner loop
/// breaks as soon as a span exceeds the max, since the span only grows with
/// `j`. Generation stops entirely once the accumulated candidate count
/// exceeds the soft cap, bounding the O(S²) sweep on long transcripts.
pub fn generate_anchored(
    spans: &[SentenceSpan],
    silence: &SilenceIndex,
    turns: Option<&[SpeakerTurn]>,
    config: &DetectionConfig,
) -> Vec<ScoredWindow> {
    let mut candidates = Vec::new();
    let cap = config.candidate_cap();

    'sweep: for i in 0..spans.len() {
        let mut text = String::new();

        for j in i..spans.len() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&spans[j].text);

            let raw_start = spans[i].start_ms;
            let raw_end = spans[j].end_ms;
            let span = raw_end.saturating_sub(raw_start);

            if span < config.bounds.min_ms {
                continue;
            }
            if span > config.bounds.max_ms {
                break;
            }

            let (start_ms, end_ms) = snap_window(raw_start, raw_end, silence, config);

            let breakdown = score_window(
                HeuristicInput {
                    start_ms,
                    end_ms,
                    text: &text,
                    turns,
                },
                config,
            );
            if breakdown.overall <= 0.0 {
                continue;
            }

            candidates.push(ScoredWindow {
                window: Window::anchored(start_ms, end_ms, i, j),
                score: breakdown.overall,
                breakdown: Some(breakdown),
            });

            if candidates.len() > cap {
                debug!(
                    candidates = candidates.len(),
                    cap, "Candidate cap reached, stopping enumeration"
                );
                break 'sweep;
            }
        }
    }

    debug!(
        sentences = spans.len(),
        candidates = candidates.len(),
        "Anchored generation complete"
    );

    candidates
}

/// Snap both edges independently, keeping the duration inside the bounds.
///
/// If a snapped pair violates the bounds, edges revert to their raw
/// positions one at a time (end first), so the correction can never undo
/// the duration checks the enumeration already passed.
fn snap_window(
    raw_start: u64,
    raw_end: u64,
    silence: &SilenceIndex,
    config: &DetectionConfig,
) -> (u64, u64) {
    let snapped_start = silence.snap_left(raw_start, config.snap_threshold_ms);
    let snapped_end = silence.snap_right(raw_end, config.snap_threshold_ms);

    for (start, end) in [
        (snapped_start, snapped_end),
        (snapped_start, raw_end),
        (raw_start, snapped_end),
        (raw_start, raw_end),
    ] {
        if end > start && config.bounds.contains(end - start) {
            return (start, end);
        }
    }

    (raw_start, raw_end)
}

/// Derive recommendation windows from persisted segments, or tile the full
/// duration when none exist.
pub fn generate_sliding(
    segments: &[MediaSegment],
    duration_ms: u64,
    bounds: &WindowBounds,
) -> Vec<Window> {
    let mut seen: BTreeSet<(u64, u64)> = BTreeSet::new();
    let mut windows = Vec::new();
    let mut push = |start: u64, end: u64, out: &mut Vec<Window>| {
        if end > start && seen.insert((start, end)) {
            out.push(Window::span(start, end));
        }
    };

    if segments.is_empty() {
        let stride = bounds.min_ms.max((bounds.min_ms + bounds.max_ms) / 2);
        let mut start = 0;
        while start < duration_ms {
            let end = (start + bounds.max_ms).min(duration_ms);
            if end.saturating_sub(start) >= bounds.min_ms {
                push(start, end, &mut windows);
            }
            start += stride;
        }

        debug!(
            duration_ms,
            windows = windows.len(),
            "Tiled timeline without segments"
        );
        return windows;
    }

    for segment in segments {
        let span = segment.duration_ms();
        let len = bounds.clamp(span);

        // Window of clamped length centered on the segment.
        let center = segment.start_ms + span / 2;
        let start = center.saturating_sub(len / 2);
        push(start, start + len, &mut windows);

        // Oversized segments additionally get stepped sub-windows.
        if span > bounds.max_ms {
            let step = bounds
                .min_ms
                .max(bounds.max_ms.saturating_sub(OVERSIZE_STEP_OFFSET_MS));
            let mut sub_start = segment.start_ms;
            while sub_start + bounds.max_ms <= segment.end_ms {
                push(sub_start, sub_start + bounds.max_ms, &mut windows);
                sub_start += step;
            }
        }
    }

    debug!(
        segments = segments.len(),
        windows = windows.len(),
        "Expanded segments into windows"
    );

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::segment_sentences;
    use crate::select::select_top;
    use cliprank_models::{MediaId, Word};

    fn sentence(start_ms: u64, end_ms: u64, text: &str) -> SentenceSpan {
        SentenceSpan {
            start_ms,
            end_ms,
            text: text.to_string(),
        }
    }

    fn default_config() -> DetectionConfig {
        DetectionConfig::default()
    }

    #[test]
    fn test_anchored_windows_respect_bounds() {
        let spans = vec![
            sentence(0, 8_000, "First sentence here."),
            sentence(8_000, 20_000, "Second sentence with more words."),
            sentence(20_000, 45_000, "Third one."),
            sentence(45_000, 70_000, "Fourth closes this out."),
        ];

        let candidates =
            generate_anchored(&spans, &SilenceIndex::empty(), None, &default_config());

        assert!(!candidates.is_empty());
        for c in &candidates {
            let duration = c.window.duration_ms();
            assert!(duration >= 10_000, "window shorter than min: {}", duration);
            assert!(duration <= 60_000, "window longer than max: {}", duration);
        }
    }

    #[test]
    fn test_anchored_inner_loop_breaks_on_max() {
        // Sentences grow past the max quickly; no pair starting at index 0
        // may reach index 3 (0..=3 spans 90s > 60s max).
        let spans = vec![
            sentence(0, 30_000, "a."),
            sentence(30_000, 60_000, "b."),
            sentence(60_000, 90_000, "c."),
            sentence(90_000, 120_000, "d."),
        ];

        let candidates =
            generate_anchored(&spans, &SilenceIndex::empty(), None, &default_config());

        assert!(candidates
            .iter()
            .all(|c| c.window.duration_ms() <= 60_000));
    }

    #[test]
    fn test_anchored_soft_cap_stops_generation() {
        // 40 short sentences produce far more than cap pairs for
        // max_candidates = 1 (cap = 10).
        let spans: Vec<SentenceSpan> = (0..40)
            .map(|i| sentence(i * 3_000, (i + 1) * 3_000, "short sentence."))
            .collect();

        let config = DetectionConfig {
            max_candidates: 1,
            ..default_config()
        };
        let candidates = generate_anchored(&spans, &SilenceIndex::empty(), None, &config);

        assert_eq!(candidates.len(), config.candidate_cap() + 1);
    }

    #[test]
    fn test_anchored_snaps_edges() {
        use cliprank_models::SilenceInterval;

        let spans = vec![
            sentence(10_000, 25_000, "Something said here."),
            sentence(25_000, 40_000, "And something after."),
        ];
        // Silence ends 80ms after the first sentence starts.
        let silence = SilenceIndex::new(&[SilenceInterval::new(9_000, 10_080)]);

        let candidates = generate_anchored(&spans, &silence, None, &default_config());
        assert!(candidates.iter().any(|c| c.window.start_ms == 10_080));
    }

    #[test]
    fn test_snap_reverts_when_bounds_break() {
        use cliprank_models::SilenceInterval;

        let config = default_config();
        // Snapping the start forward by 200ms would leave a 9.9s window,
        // below the 10s minimum; the start must revert.
        let silence = SilenceIndex::new(&[SilenceInterval::new(0, 10_200)]);
        let (start, end) = snap_window(10_000, 20_100, &silence, &config);
        assert_eq!((start, end), (10_000, 20_100));
    }

    #[test]
    fn test_sliding_without_segments_tiles() {
        let bounds = WindowBounds::default();
        let windows = generate_sliding(&[], 180_000, &bounds);

        assert!(!windows.is_empty());
        // Stride is max(10s, 35s) = 35s.
        assert_eq!(windows[0].start_ms, 0);
        assert_eq!(windows[0].end_ms, 60_000);
        assert_eq!(windows[1].start_ms, 35_000);
        for w in &windows {
            assert!(w.duration_ms() >= bounds.min_ms);
            assert!(w.duration_ms() <= bounds.max_ms);
        }
    }

    #[test]
    fn test_sliding_drops_short_trailing_tile() {
        let bounds = WindowBounds::default();
        // 75s duration: tiles at 0 (60s) and 35s (40s); the 70s tile would
        // be 5s, below min, and must be dropped.
        let windows = generate_sliding(&[], 75_000, &bounds);
        assert!(windows.iter().all(|w| w.duration_ms() >= bounds.min_ms));
        assert!(windows.iter().all(|w| w.end_ms <= 75_000));
    }

    #[test]
    fn test_sliding_centers_on_segment() {
        let bounds = WindowBounds::default();
        let segment = MediaSegment::new(MediaId::new(), 40_000, 60_000, 0.8);
        let windows = generate_sliding(&[segment], 300_000, &bounds);

        // 20s span sits inside bounds; window is the clamped 20s itself,
        // centered on the segment midpoint (50s).
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_ms, 40_000);
        assert_eq!(windows[0].end_ms, 60_000);
    }

    #[test]
    fn test_sliding_oversized_segment_gets_sub_windows() {
        let bounds = WindowBounds::default();
        // 200s segment: clamped centered window plus stepped 60s sub-windows
        // at step max(10s, 55s) = 55s.
        let segment = MediaSegment::new(MediaId::new(), 0, 200_000, 0.9);
        let windows = generate_sliding(&[segment], 300_000, &bounds);

        assert!(windows.len() > 1);
        assert!(windows.iter().any(|w| w.start_ms == 0 && w.end_ms == 60_000));
        assert!(windows
            .iter()
            .any(|w| w.start_ms == 55_000 && w.end_ms == 115_000));
        for w in &windows {
            assert!(w.duration_ms() <= bounds.max_ms);
        }
    }

    #[test]
    fn test_sliding_emits_no_duplicate_pairs() {
        let bounds = WindowBounds::default();
        let segments = vec![
            MediaSegment::new(MediaId::new(), 0, 200_000, 0.9),
            MediaSegment::new(MediaId::new(), 0, 200_000, 0.7),
        ];
        let windows = generate_sliding(&segments, 300_000, &bounds);

        let mut pairs: Vec<(u64, u64)> = windows.iter().map(|w| (w.start_ms, w.end_ms)).collect();
        let before = pairs.len();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(before, pairs.len());
    }

    #[test]
    fn test_detection_end_to_end() {
        // Five sentences spanning 0..90s, no silence data, top 3.
        let mut words = Vec::new();
        for (s, text) in [
            (0u64, "The opening promise lands right here today."),
            (18_000, "Why this matters is not obvious at first."),
            (36_000, "Here's the secret most people keep missing."),
            (54_000, "We tested it across every case we had."),
            (72_000, "So the bottom line is surprisingly simple."),
        ] {
            for (k, token) in text.split_whitespace().enumerate() {
                let word_start = s + k as u64 * 2_000;
                words.push(Word::new(token, word_start, word_start + 2_000));
            }
        }

        let spans = segment_sentences(&words);
        assert_eq!(spans.len(), 5);

        let config = DetectionConfig {
            max_candidates: 3,
            ..default_config()
        };
        let candidates = generate_anchored(&spans, &SilenceIndex::empty(), None, &config);

        for c in &candidates {
            assert!(c.window.duration_ms() <= 60_000);
        }

        let selected = select_top(candidates, config.max_candidates);
        assert!(selected.len() <= 3);
        for pair in selected.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // No two selected windows share a sentence.
        for a in 0..selected.len() {
            for b in (a + 1)..selected.len() {
                let (ai, aj) = selected[a].window.sentences.unwrap();
                let (bi, bj) = selected[b].window.sentences.unwrap();
                assert!(aj < bi || bj < ai, "selected windows overlap");
            }
        }
    }
}
