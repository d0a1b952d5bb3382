//! Clip list ordering.

use std::cmp::Ordering;

use cliprank_models::Clip;

/// Sort clips for listing: score descending, then created_at descending.
///
/// The sort is stable, so equal clips keep their insertion order and
/// paging stays consistent across requests.
pub fn sort_clips_for_listing(clips: &mut [Clip]) {
    clips.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
