//! Keyed merge-diff
//!
//! Reconciles a previous ordered list of keyed items with the next one.
//! Items in the next list keep the next list's order. Items that left may be
//! kept (to animate out) and are woven back in where they used to sit.
//!
//! # Ordering
//!
//! The result is a merge of two chains: the next list in its own order, and
//! the retained leaving items in their previous order. Where a next item and
//! a leaving item meet, their relative order is decided by:
//!
//! 1. Both have a previous position: previous order wins.
//! 2. The next item is new: look for a pivot, an item present in both lists,
//!    that sits after the new item in the next list and before the leaving
//!    item in the previous list (or the mirror image). The first such pivot
//!    in next order decides.
//! 3. No pivot decides: the new item goes after the leaving item. This
//!    tie-break is arbitrary, kept for stable-looking reorders.
//!
//! Merging chains instead of sorting with the pairwise rule keeps the output
//! a total order even when the rule is not transitive.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{AnimationError, Result};

/// Items that carry a unique key within a list
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Merge `prev` into `next`.
///
/// `on_remove` is called once per item of `prev` whose key is missing from
/// `next`, with its previous index. Returning `Some(item)` keeps a
/// replacement in the result at the leaving item's old position; `None`
/// drops it. Errors from `on_remove` abort the merge and are returned as-is.
///
/// Duplicate keys in either list are rejected with
/// [`AnimationError::DuplicateKey`] before `on_remove` is ever called.
pub fn merge_diff<T, F>(prev: &[T], next: &[T], mut on_remove: F) -> Result<Vec<T>>
where
    T: Keyed + Clone,
    F: FnMut(usize, &T) -> Result<Option<T>>,
{
    let prev_index = index_keys(prev)?;
    let next_index = index_keys(next)?;

    // Retained leaving items, in previous order
    let mut leaving: SmallVec<[(usize, T); 4]> = SmallVec::new();
    for (i, item) in prev.iter().enumerate() {
        if next_index.contains_key(item.key()) {
            continue;
        }
        if let Some(fill) = on_remove(i, item)? {
            leaving.push((i, fill));
        }
    }

    tracing::trace!(
        prev = prev.len(),
        next = next.len(),
        retained = leaving.len(),
        "merge diff"
    );

    // Items present in both lists, in next order
    let pivots: SmallVec<[(usize, usize); 8]> = next
        .iter()
        .enumerate()
        .filter_map(|(j, item)| prev_index.get(item.key()).map(|&i| (j, i)))
        .collect();

    let mut merged = Vec::with_capacity(next.len() + leaving.len());
    let mut next_iter = next.iter().enumerate().peekable();
    let mut leaving_iter = leaving.into_iter().peekable();

    loop {
        let take_next = match (next_iter.peek(), leaving_iter.peek()) {
            (Some(&(j, item)), Some(&(old, _))) => {
                next_goes_first(j, prev_index.get(item.key()).copied(), old, &pivots)
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if take_next {
            if let Some((_, item)) = next_iter.next() {
                merged.push(item.clone());
            }
        } else if let Some((_, item)) = leaving_iter.next() {
            merged.push(item);
        }
    }

    Ok(merged)
}

/// Decide whether the next item at `next_pos` precedes the leaving item that
/// used to sit at `leaving_prev_pos`.
fn next_goes_first(
    next_pos: usize,
    next_prev_pos: Option<usize>,
    leaving_prev_pos: usize,
    pivots: &[(usize, usize)],
) -> bool {
    if let Some(prev_pos) = next_prev_pos {
        return prev_pos < leaving_prev_pos;
    }

    for &(pivot_next, pivot_prev) in pivots {
        if next_pos < pivot_next && leaving_prev_pos > pivot_prev {
            return true;
        }
        if next_pos > pivot_next && leaving_prev_pos < pivot_prev {
            return false;
        }
    }

    // New after old
    false
}

fn index_keys<T: Keyed>(items: &[T]) -> Result<FxHashMap<&str, usize>> {
    let mut index = FxHashMap::with_capacity_and_hasher(items.len(), Default::default());
    for (i, item) in items.iter().enumerate() {
        if index.insert(item.key(), i).is_some() {
            return Err(AnimationError::DuplicateKey(item.key().to_string()));
        }
    }
    Ok(index)
}

/// Reject lists with repeated keys
pub fn ensure_unique_keys<T: Keyed>(items: &[T]) -> Result<()> {
    index_keys(items).map(|_| ())
}
