//! Parallel iteration over in-memory sequences (`&[T]`, `&Vec<T>`).

use super::plumbing::{bridge, Consumer, Producer, UnindexedConsumer};
use super::{BoundedParallelIterator, IntoParallelIterator, ParallelIterator};

/// A parallel iterator over the elements of a slice, by reference.
pub fn from_sequence<T: Sync>(seq: &[T]) -> SliceIter<'_, T> {
    SliceIter { slice: seq }
}

pub struct SliceIter<'data, T: Sync> {
    slice: &'data [T],
}

impl<'data, T: Sync + 'data> IntoParallelIterator for &'data [T] {
    type Item = &'data T;
    type Iter = SliceIter<'data, T>;

    fn into_par_iter(self) -> Self::Iter {
        SliceIter { slice: self }
    }
}

impl<'data, T: Sync + 'data> IntoParallelIterator for &'data Vec<T> {
    type Item = &'data T;
    type Iter = SliceIter<'data, T>;

    fn into_par_iter(self) -> Self::Iter {
        SliceIter { slice: self }
    }
}

impl<'data, T: Sync + 'data> ParallelIterator for SliceIter<'data, T> {
    type Item = &'data T;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(SliceProducer { slice: self.slice }, consumer)
    }
}

impl<'data, T: Sync + 'data> BoundedParallelIterator for SliceIter<'data, T> {
    fn upper_bound(&self) -> usize {
        self.slice.len()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<Self::Item>,
    {
        bridge(SliceProducer { slice: self.slice }, consumer)
    }
}

struct SliceProducer<'data, T: Sync> {
    slice: &'data [T],
}

impl<'data, T: Sync + 'data> Producer for SliceProducer<'data, T> {
    type Item = &'data T;
    type IntoIter = std::slice::Iter<'data, T>;

    fn len(&self) -> usize {
        self.slice.len()
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let (left, right) = self.slice.split_at(index);
        (SliceProducer { slice: left }, SliceProducer { slice: right })
    }

    fn into_iter(self) -> Self::IntoIter {
        self.slice.iter()
    }
}
