//! Parallel iterators: splittable sources, stackable adapters, and the
//! terminal operations that fold them.
//!
//! A pipeline is built by wrapping a source (`from_range`, `from_sequence`,
//! `from_iterable`, or `into_par_iter()`) in zero or more adapters and
//! finishing with a terminal operation. Nothing runs until the terminal
//! operation hands the assembled producer-consumer pair to the bridge.

use std::iter::Sum;

pub mod plumbing;

mod any_all;
mod collect;
mod count;
mod filter;
mod filter_map;
mod for_each;
mod iterable;
mod map;
mod min_max;
mod range;
mod reduce;
mod slice;
mod sum;

#[cfg(test)]
mod test;

pub use self::filter::Filter;
pub use self::filter_map::FilterMap;
pub use self::iterable::{from_iterable, IterableIter};
pub use self::map::Map;
pub use self::range::{from_range, RangeIter};
pub use self::slice::{from_sequence, SliceIter};

use self::plumbing::{Consumer, UnindexedConsumer};

/// A value convertible into a parallel iterator.
pub trait IntoParallelIterator {
    type Iter: ParallelIterator<Item = Self::Item>;
    type Item: Send;

    fn into_par_iter(self) -> Self::Iter;
}

/// An iterator whose elements are processed in parallel.
///
/// The operations here work on every pipeline, indexed or not. Their
/// results are independent of how work was divided among threads as long
/// as the user-supplied closures are pure (or at least associative where
/// the operation's contract says so); see the individual methods.
pub trait ParallelIterator: Sized + Send {
    type Item: Send;

    /// Drive `consumer` over this iterator's elements. Internal entry
    /// point; terminal operations are built on it.
    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>;

    /// Transform each element with `map_op`.
    ///
    /// `map_op` runs concurrently on distinct elements; side effects are
    /// observed in unspecified order unless the terminal operation is
    /// ordered.
    fn map<F, R>(self, map_op: F) -> Map<Self, F>
    where
        F: Fn(Self::Item) -> R + Sync + Send,
        R: Send,
    {
        Map::new(self, map_op)
    }

    /// Keep only the elements for which `filter_op` returns true.
    fn filter<P>(self, filter_op: P) -> Filter<Self, P>
    where
        P: Fn(&Self::Item) -> bool + Sync + Send,
    {
        Filter::new(self, filter_op)
    }

    /// Map and filter in one pass: elements mapped to `None` are dropped.
    fn filter_map<F, R>(self, filter_op: F) -> FilterMap<Self, F>
    where
        F: Fn(Self::Item) -> Option<R> + Sync + Send,
        R: Send,
    {
        FilterMap::new(self, filter_op)
    }

    /// Call `op` on every element, in no particular order.
    fn for_each<OP>(self, op: OP)
    where
        OP: Fn(Self::Item) + Sync + Send,
    {
        for_each::for_each(self, &op)
    }

    /// Add all elements. An empty iterator yields the additive identity.
    ///
    /// Integer sums are exact; float sums may differ by rounding across
    /// thread counts because the grouping of additions is not fixed.
    fn sum<S>(self) -> S
    where
        S: Send + Sum<Self::Item> + Sum<S>,
    {
        sum::sum(self)
    }

    /// Count the elements.
    fn count(self) -> usize {
        count::count(self)
    }

    /// Reduce the elements with `op`, seeding each sequential chunk with
    /// `identity()`.
    ///
    /// `op` must be associative for a deterministic result; `identity()`
    /// must produce its identity value.
    fn reduce<OP, ID>(self, identity: ID, op: OP) -> Self::Item
    where
        OP: Fn(Self::Item, Self::Item) -> Self::Item + Sync + Send,
        ID: Fn() -> Self::Item + Sync + Send,
    {
        reduce::reduce(self, identity, op)
    }

    /// The smallest element; `None` when empty. Ties go to the earlier
    /// element.
    fn min(self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        min_max::min(self)
    }

    /// The largest element; `None` when empty. Ties go to the earlier
    /// element.
    fn max(self) -> Option<Self::Item>
    where
        Self::Item: Ord,
    {
        min_max::max(self)
    }

    /// The element with the smallest key under `f`; `None` when empty.
    fn min_by_key<K, F>(self, f: F) -> Option<Self::Item>
    where
        K: Ord + Send,
        F: Fn(&Self::Item) -> K + Sync + Send,
    {
        min_max::min_by_key(self, f)
    }

    /// The element with the largest key under `f`; `None` when empty.
    fn max_by_key<K, F>(self, f: F) -> Option<Self::Item>
    where
        K: Ord + Send,
        F: Fn(&Self::Item) -> K + Sync + Send,
    {
        min_max::max_by_key(self, f)
    }

    /// True if `predicate` holds for some element; false when empty.
    /// Stops examining elements once a witness is found.
    fn any<P>(self, predicate: P) -> bool
    where
        P: Fn(Self::Item) -> bool + Sync + Send,
    {
        any_all::any(self, predicate)
    }

    /// True if `predicate` holds for every element; true when empty.
    /// Stops examining elements once a counterexample is found.
    fn all<P>(self, predicate: P) -> bool
    where
        P: Fn(Self::Item) -> bool + Sync + Send,
    {
        any_all::all(self, predicate)
    }
}

/// A parallel iterator backed by an indexed source, whose splits preserve
/// global element order. Order-dependent terminal operations live here, so
/// they are simply unavailable on unindexed streams.
pub trait BoundedParallelIterator: ParallelIterator {
    /// An upper bound on the number of elements this pipeline can yield
    /// (exact for sources, an over-approximation past a filter).
    fn upper_bound(&self) -> usize;

    /// Drive an indexed consumer over this iterator's elements. Internal
    /// entry point.
    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<Self::Item>;

    /// Gather all elements into a vector, in source order.
    fn collect(self) -> Vec<Self::Item> {
        collect::collect(self)
    }

    /// Call `op` on every element in source order. The pipeline stages
    /// still run in parallel; the elements are materialised and the side
    /// effect is applied sequentially on the calling thread.
    fn for_each_ordered<OP>(self, op: OP)
    where
        OP: FnMut(Self::Item),
    {
        for_each::for_each_ordered(self, op)
    }
}
