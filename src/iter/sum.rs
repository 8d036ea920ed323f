//! The `sum` terminal.

use std::iter::{self, Sum};
use std::marker::PhantomData;

use super::plumbing::{Consumer, Folder, Reducer, UnindexedConsumer};
use super::ParallelIterator;

pub(super) fn sum<I, S>(pi: I) -> S
where
    I: ParallelIterator,
    S: Send + Sum<I::Item> + Sum<S>,
{
    pi.drive_unindexed(SumConsumer::new())
}

fn add<S: Sum<S>>(left: S, right: S) -> S {
    iter::once(left).chain(iter::once(right)).sum()
}

struct SumConsumer<S: Send> {
    _marker: PhantomData<S>,
}

impl<S: Send> SumConsumer<S> {
    fn new() -> SumConsumer<S> {
        SumConsumer {
            _marker: PhantomData,
        }
    }
}

impl<S, T> Consumer<T> for SumConsumer<S>
where
    S: Send + Sum<T> + Sum<S>,
{
    type Folder = SumFolder<S>;
    type Reducer = Self;
    type Result = S;

    fn split_at(self, _index: usize) -> (Self, Self, Self) {
        (SumConsumer::new(), SumConsumer::new(), SumConsumer::new())
    }

    fn into_folder(self) -> SumFolder<S> {
        SumFolder {
            // The additive identity: the sum of no elements.
            sum: iter::empty::<T>().sum(),
        }
    }

    fn full(&self) -> bool {
        false
    }
}

impl<S, T> UnindexedConsumer<T> for SumConsumer<S>
where
    S: Send + Sum<T> + Sum<S>,
{
    fn split(&self) -> Self {
        SumConsumer::new()
    }

    fn reducer(&self) -> Self {
        SumConsumer::new()
    }
}

impl<S> Reducer<S> for SumConsumer<S>
where
    S: Send + Sum<S>,
{
    fn reduce(self, left: S, right: S) -> S {
        add(left, right)
    }
}

struct SumFolder<S> {
    sum: S,
}

impl<S, T> Folder<T> for SumFolder<S>
where
    S: Sum<T> + Sum<S>,
{
    type Result = S;

    fn consume(self, item: T) -> Self {
        SumFolder {
            sum: add(self.sum, iter::once(item).sum()),
        }
    }

    fn consume_iter<I>(self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        SumFolder {
            sum: add(self.sum, iter.into_iter().sum()),
        }
    }

    fn complete(self) -> S {
        self.sum
    }

    fn full(&self) -> bool {
        false
    }
}
