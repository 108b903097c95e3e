use crate::model::{HarvestedReview, Review};

/// Newest first, at most `target_count`, with resolved dates dropped.
///
/// The sort is stable, so reviews sharing a date keep their discovery order.
pub fn finalize(mut harvested: Vec<HarvestedReview>, target_count: usize) -> Vec<Review> {
    harvested.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
    harvested.truncate(target_count);
    harvested.into_iter().map(|h| h.review).collect()
}
