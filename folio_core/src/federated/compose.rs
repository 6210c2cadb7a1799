//! Page composition: merge, shuffle, then keep only books with a cover.

use super::{ComposedPage, UnifiedBook};
use rand::seq::SliceRandom;
use rand::Rng;

/// Compose normalized lists into one display page.
///
/// Lists are concatenated without any per-source weighting, shuffled
/// uniformly, and stripped of books that have no cover. Filtering happens
/// after the shuffle, so the surviving books keep the shuffled order.
pub fn compose(lists: Vec<Vec<UnifiedBook>>) -> ComposedPage {
    compose_with_rng(lists, &mut rand::thread_rng())
}

/// [`compose`] with a caller-supplied RNG, for reproducible ordering.
pub fn compose_with_rng<R: Rng + ?Sized>(
    lists: Vec<Vec<UnifiedBook>>,
    rng: &mut R,
) -> ComposedPage {
    let mut merged: Vec<UnifiedBook> = lists.into_iter().flatten().collect();
    merged.shuffle(rng);
    merged.retain(UnifiedBook::has_cover);
    ComposedPage::new(merged)
}
