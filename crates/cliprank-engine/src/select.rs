//! Greedy window selection and deduplication.
//!
//! Deterministic weighted-independent-set approximation: walk candidates in
//! descending score order, accept a window only when none of its units
//! (sentence indices or millisecond ranges, depending on how it was
//! generated) are already claimed. Not globally optimal, but stable and
//! cheap.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::window::ScoredWindow;

/// Select up to `max_candidates` non-overlapping windows by descending
/// score. Ties break on start then end so the result is independent of the
/// input order.
pub fn select_top(mut candidates: Vec<ScoredWindow>, max_candidates: usize) -> Vec<ScoredWindow> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.window.start_ms.cmp(&b.window.start_ms))
            .then_with(|| a.window.end_ms.cmp(&b.window.end_ms))
    });

    let mut claimed_sentences: HashSet<usize> = HashSet::new();
    let mut claimed_spans: Vec<(u64, u64)> = Vec::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        if accepted.len() >= max_candidates {
            break;
        }

        let free = match candidate.window.sentences {
            Some((first, last)) => (first..=last).all(|i| !claimed_sentences.contains(&i)),
            None => !claimed_spans.iter().any(|&(start, end)| {
                candidate.window.start_ms < end && candidate.window.end_ms > start
            }),
        };
        if !free {
            continue;
        }

        match candidate.window.sentences {
            Some((first, last)) => claimed_sentences.extend(first..=last),
            None => claimed_spans.push((candidate.window.start_ms, candidate.window.end_ms)),
        }
        accepted.push(candidate);
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::Window;

    fn anchored(start_ms: u64, end_ms: u64, first: usize, last: usize, score: f64) -> ScoredWindow {
        ScoredWindow {
            window: Window::anchored(start_ms, end_ms, first, last),
            score,
            breakdown: None,
        }
    }

    fn span(start_ms: u64, end_ms: u64, score: f64) -> ScoredWindow {
        ScoredWindow {
            window: Window::span(start_ms, end_ms),
            score,
            breakdown: None,
        }
    }

    #[test]
    fn test_highest_score_wins_conflicts() {
        let selected = select_top(
            vec![
                anchored(0, 30_000, 0, 2, 0.5),
                anchored(10_000, 40_000, 1, 3, 0.9),
            ],
            5,
        );

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].score, 0.9);
    }

    #[test]
    fn test_sentence_units_claimed() {
        let selected = select_top(
            vec![
                anchored(0, 30_000, 0, 1, 0.9),
                anchored(40_000, 70_000, 2, 3, 0.8),
                anchored(20_000, 50_000, 1, 2, 0.85), // shares sentences with both
            ],
            5,
        );

        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|w| w.score != 0.85));
    }

    #[test]
    fn test_ms_ranges_never_intersect() {
        let selected = select_top(
            vec![
                span(0, 30_000, 0.7),
                span(29_999, 60_000, 0.6),
                span(60_000, 90_000, 0.5),
            ],
            5,
        );

        // Second window overlaps the first by 1ms and must be dropped.
        assert_eq!(selected.len(), 2);
        for a in 0..selected.len() {
            for b in (a + 1)..selected.len() {
                let (asp, aep) = (selected[a].window.start_ms, selected[a].window.end_ms);
                let (bsp, bep) = (selected[b].window.start_ms, selected[b].window.end_ms);
                assert!(aep <= bsp || bep <= asp);
            }
        }
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let selected = select_top(vec![span(0, 30_000, 0.7), span(0, 30_000, 0.7)], 5);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_stops_at_max_candidates() {
        let candidates: Vec<ScoredWindow> = (0..10)
            .map(|i| span(i * 40_000, i * 40_000 + 30_000, 0.9 - i as f64 * 0.01))
            .collect();

        let selected = select_top(candidates, 3);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_result_sorted_by_score_desc() {
        let selected = select_top(
            vec![
                span(0, 30_000, 0.3),
                span(40_000, 70_000, 0.9),
                span(80_000, 110_000, 0.6),
            ],
            5,
        );

        let scores: Vec<f64> = selected.iter().map(|w| w.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }

    #[test]
    fn test_deterministic_under_input_order() {
        let a = select_top(
            vec![span(0, 30_000, 0.5), span(10_000, 40_000, 0.5)],
            5,
        );
        let b = select_top(
            vec![span(10_000, 40_000, 0.5), span(0, 30_000, 0.5)],
            5,
        );

        assert_eq!(a.len(), 1);
        assert_eq!(a[0].window.start_ms, b[0].window.start_ms);
    }
}
