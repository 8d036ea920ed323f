//! The `min`/`max` terminals, with and without key projection.
//!
//! All four are reductions over `Option`: every chunk folds to its local
//! optimum and siblings combine left-then-right, keeping the earlier
//! element on ties.

use super::ParallelIterator;

pub(super) fn min<I>(pi: I) -> Option<I::Item>
where
    I: ParallelIterator,
    I::Item: Ord,
{
    pi.map(Some).reduce(
        || None,
        |left, right| match (left, right) {
            (Some(left), Some(right)) => Some(if right < left { right } else { left }),
            (Some(left), None) => Some(left),
            (None, right) => right,
        },
    )
}

pub(super) fn max<I>(pi: I) -> Option<I::Item>
where
    I: ParallelIterator,
    I::Item: Ord,
{
    pi.map(Some).reduce(
        || None,
        |left, right| match (left, right) {
            (Some(left), Some(right)) => Some(if right > left { right } else { left }),
            (Some(left), None) => Some(left),
            (None, right) => right,
        },
    )
}

pub(super) fn min_by_key<I, K, F>(pi: I, f: F) -> Option<I::Item>
where
    I: ParallelIterator,
    K: Ord + Send,
    F: Fn(&I::Item) -> K + Sync + Send,
{
    pi.map(move |item| {
        let key = f(&item);
        Some((key, item))
    })
    .reduce(
        || None,
        |left, right| match (left, right) {
            (Some(left), Some(right)) => Some(if right.0 < left.0 { right } else { left }),
            (Some(left), None) => Some(left),
            (None, right) => right,
        },
    )
    .map(|(_, item)| item)
}

pub(super) fn max_by_key<I, K, F>(pi: I, f: F) -> Option<I::Item>
where
    I: ParallelIterator,
    K: Ord + Send,
    F: Fn(&I::Item) -> K + Sync + Send,
{
    pi.map(move |item| {
        let key = f(&item);
        Some((key, item))
    })
    .reduce(
        || None,
        |left, right| match (left, right) {
            (Some(left), Some(right)) => Some(if right.0 > left.0 { right } else { left }),
            (Some(left), None) => Some(left),
            (None, right) => right,
        },
    )
    .map(|(_, item)| item)
}
