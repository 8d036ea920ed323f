//! The internal contract between element sources and the operations that
//! fold them: producers, consumers, folders, reducers, and the bridge that
//! recursively splits a producer-consumer pair over the worker pool.
//!
//! The contract that makes all of this correct: for any producer `P` and
//! any valid split of it, feeding the two halves to the two siblings
//! returned by `Consumer::split_at` and reducing the partials must yield
//! the same result as feeding all of `P` to the original consumer. Every
//! consumer in this crate upholds that, which lets the bridge pick split
//! points freely.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::trace;

use crate::config::{self, SplitPolicy};
use crate::registry::{self, Registry};

/// A splittable, ordered source of elements with a known length.
pub trait Producer: Send + Sized {
    type Item;
    type IntoIter: Iterator<Item = Self::Item>;

    /// How many elements remain. Must be exact: `into_iter` yields this
    /// many items.
    fn len(&self) -> usize;

    /// Split into two producers; one produces items `0..index`, the other
    /// `index..len`. `index` out of `0..=len` is a programming error.
    fn split_at(self, index: usize) -> (Self, Self);

    /// Materialise into an in-order sequential iterator, consuming the
    /// producer.
    fn into_iter(self) -> Self::IntoIter;

    /// Drive `folder` over this producer's elements, honouring its `full`
    /// short-circuit.
    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        folder.consume_iter(self.into_iter())
    }
}

/// A splittable source of unknown length (a stream). Splitting may buffer;
/// the underlying source is consumed exactly once across the recursion.
pub trait UnindexedProducer: Send + Sized {
    type Item;

    /// Split off a leading piece, returning `None` as the right sibling
    /// when the source cannot be split further.
    fn split(self) -> (Self, Option<Self>);

    /// Drive `folder` over the remaining elements, honouring `full`.
    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>;
}

/// Folds an element stream into a partial result, and splits into sibling
/// consumers mirroring a producer split.
pub trait Consumer<Item>: Send + Sized {
    type Folder: Folder<Item, Result = Self::Result>;
    type Reducer: Reducer<Self::Result>;
    type Result: Send;

    /// Split into consumers for elements `0..index` and `index..`, plus the
    /// reducer that recombines their partial results. The bridge always
    /// reduces left-then-right, so consumers with a non-commutative combine
    /// (collect) stay correct.
    fn split_at(self, index: usize) -> (Self, Self, Self::Reducer);

    /// Start folding a contiguous run of elements.
    fn into_folder(self) -> Self::Folder;

    /// True when further elements cannot change the result; the bridge then
    /// stops splitting and folders stop consuming.
    fn full(&self) -> bool;
}

/// A consumer that can also pair with unindexed producers, where splits
/// carry no index.
pub trait UnindexedConsumer<Item>: Consumer<Item> {
    /// A sibling consumer for the left part of an unindexed split; `self`
    /// keeps consuming the right part.
    fn split(&self) -> Self;

    /// The reducer recombining the sibling partials.
    fn reducer(&self) -> Self::Reducer;
}

/// The sequential half of a consumer: accumulates elements one at a time.
pub trait Folder<Item>: Sized {
    type Result;

    /// Consume one element.
    fn consume(self, item: Item) -> Self;

    /// Consume a run of elements, stopping early once `full` reports true.
    fn consume_iter<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        for item in iter {
            if self.full() {
                break;
            }
            self = self.consume(item);
        }
        self
    }

    /// Finish, yielding the partial result.
    fn complete(self) -> Self::Result;

    fn full(&self) -> bool;
}

/// Combines two sibling partial results. Must be associative; applied
/// left-then-right by the bridge.
pub trait Reducer<Result> {
    fn reduce(self, left: Result, right: Result) -> Result;
}

/// Reducer for consumers whose result is `()`.
pub struct NoopReducer;

impl Reducer<()> for NoopReducer {
    fn reduce(self, _left: (), _right: ()) {}
}

///////////////////////////////////////////////////////////////////////////
// The bridge

/// Marks the shared flag when a frame is abandoned by a panic, so branches
/// that have not started yet complete empty instead of doing doomed work.
struct SetOnUnwind<'a>(&'a AtomicBool);

impl Drop for SetOnUnwind<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Run an indexed producer-consumer pair to completion on the global pool.
pub fn bridge<P, C>(producer: P, consumer: C) -> C::Result
where
    P: Producer,
    C: Consumer<P::Item>,
{
    let len = producer.len();
    let policy = config::split_policy();
    let registry = config::global_registry();
    trace!("bridge: len={}, policy={:?}", len, policy);
    registry::in_worker(&registry, || {
        let panicked = AtomicBool::new(false);
        bridge_producer_consumer(len, producer, consumer, 0, policy, &panicked, &registry)
    })
}

fn bridge_producer_consumer<P, C>(
    len: usize,
    producer: P,
    consumer: C,
    depth: usize,
    policy: SplitPolicy,
    panicked: &AtomicBool,
    registry: &Arc<Registry>,
) -> C::Result
where
    P: Producer,
    C: Consumer<P::Item>,
{
    let guard = SetOnUnwind(panicked);
    let result = if panicked.load(Ordering::Relaxed) || consumer.full() {
        consumer.into_folder().complete()
    } else if len < 2 || len <= policy.min_split_size {
        producer.fold_with(consumer.into_folder()).complete()
    } else {
        let mid = len / 2;
        let (left_producer, right_producer) = producer.split_at(mid);
        let (left_consumer, right_consumer, reducer) = consumer.split_at(mid);
        if depth < policy.max_split_depth {
            // The right half is queued on the pool; the left half runs
            // here, so each frame awaits at most one spawned job.
            let (left, right) = registry::join(
                registry,
                || {
                    bridge_producer_consumer(
                        mid,
                        left_producer,
                        left_consumer,
                        depth + 1,
                        policy,
                        panicked,
                        registry,
                    )
                },
                || {
                    bridge_producer_consumer(
                        len - mid,
                        right_producer,
                        right_consumer,
                        depth + 1,
                        policy,
                        panicked,
                        registry,
                    )
                },
            );
            reducer.reduce(left, right)
        } else {
            // Below the parallel depth, keep splitting on the current
            // thread down to the minimum chunk size.
            let left = bridge_producer_consumer(
                mid,
                left_producer,
                left_consumer,
                depth + 1,
                policy,
                panicked,
                registry,
            );
            let right = bridge_producer_consumer(
                len - mid,
                right_producer,
                right_consumer,
                depth + 1,
                policy,
                panicked,
                registry,
            );
            reducer.reduce(left, right)
        }
    };
    mem::forget(guard);
    result
}

/// Run an unindexed producer-consumer pair to completion on the global
/// pool. Splits are taken only at depths where they can be spawned; past
/// the parallel depth the remaining stream is folded in place.
pub fn bridge_unindexed<P, C>(producer: P, consumer: C) -> C::Result
where
    P: UnindexedProducer,
    C: UnindexedConsumer<P::Item>,
{
    let policy = config::split_policy();
    let registry = config::global_registry();
    registry::in_worker(&registry, || {
        let panicked = AtomicBool::new(false);
        bridge_unindexed_producer_consumer(producer, consumer, 0, policy, &panicked, &registry)
    })
}

fn bridge_unindexed_producer_consumer<P, C>(
    producer: P,
    consumer: C,
    depth: usize,
    policy: SplitPolicy,
    panicked: &AtomicBool,
    registry: &Arc<Registry>,
) -> C::Result
where
    P: UnindexedProducer,
    C: UnindexedConsumer<P::Item>,
{
    let guard = SetOnUnwind(panicked);
    let result = if panicked.load(Ordering::Relaxed) || consumer.full() {
        consumer.into_folder().complete()
    } else if depth >= policy.max_split_depth {
        producer.fold_with(consumer.into_folder()).complete()
    } else {
        match producer.split() {
            (left_producer, Some(right_producer)) => {
                let reducer = consumer.reducer();
                let left_consumer = consumer.split();
                let right_consumer = consumer;
                let (left, right) = registry::join(
                    registry,
                    || {
                        bridge_unindexed_producer_consumer(
                            left_producer,
                            left_consumer,
                            depth + 1,
                            policy,
                            panicked,
                            registry,
                        )
                    },
                    || {
                        bridge_unindexed_producer_consumer(
                            right_producer,
                            right_consumer,
                            depth + 1,
                            policy,
                            panicked,
                            registry,
                        )
                    },
                );
                reducer.reduce(left, right)
            }
            (leaf_producer, None) => leaf_producer
                .fold_with(consumer.into_folder())
                .complete(),
        }
    };
    mem::forget(guard);
    result
}
