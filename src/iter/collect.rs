//! The ordered `collect` terminal.
//!
//! Each sequential chunk gathers its outputs into a local vector; sibling
//! vectors are concatenated left-then-right as the bridge unwinds, so the
//! final vector is in source order without any coordination between
//! threads.

use std::marker::PhantomData;

use super::plumbing::{Consumer, Folder, Reducer};
use super::BoundedParallelIterator;

pub(super) fn collect<I>(pi: I) -> Vec<I::Item>
where
    I: BoundedParallelIterator,
{
    pi.drive(CollectConsumer::new())
}

struct CollectConsumer<T: Send> {
    _marker: PhantomData<T>,
}

impl<T: Send> CollectConsumer<T> {
    fn new() -> CollectConsumer<T> {
        CollectConsumer {
            _marker: PhantomData,
        }
    }
}

impl<T: Send> Consumer<T> for CollectConsumer<T> {
    type Folder = CollectFolder<T>;
    type Reducer = CollectReducer;
    type Result = Vec<T>;

    fn split_at(self, _index: usize) -> (Self, Self, CollectReducer) {
        (CollectConsumer::new(), CollectConsumer::new(), CollectReducer)
    }

    fn into_folder(self) -> CollectFolder<T> {
        CollectFolder { vec: Vec::new() }
    }

    fn full(&self) -> bool {
        false
    }
}

struct CollectFolder<T> {
    vec: Vec<T>,
}

impl<T> Folder<T> for CollectFolder<T> {
    type Result = Vec<T>;

    fn consume(mut self, item: T) -> Self {
        self.vec.push(item);
        self
    }

    fn consume_iter<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.vec.extend(iter);
        self
    }

    fn complete(self) -> Vec<T> {
        self.vec
    }

    fn full(&self) -> bool {
        false
    }
}

struct CollectReducer;

impl<T> Reducer<Vec<T>> for CollectReducer {
    fn reduce(self, mut left: Vec<T>, mut right: Vec<T>) -> Vec<T> {
        if left.is_empty() {
            right
        } else {
            left.append(&mut right);
            left
        }
    }
}
