//! Parallel iteration over arbitrary iterators of unknown length.
//!
//! The stream cannot be split by index, so splitting buffers one chunk of
//! up to `min_split_size` elements at a time: the chunk becomes an
//! in-memory left sibling while the untouched remainder of the stream is
//! the right sibling. The source is consumed exactly once across the whole
//! recursion, and only ever by one thread at a time.

use std::iter::Peekable;

use crate::config;

use super::plumbing::{bridge_unindexed, Folder, UnindexedConsumer, UnindexedProducer};
use super::ParallelIterator;

/// A parallel iterator over any `IntoIterator`. Unindexed: order-dependent
/// operations (`collect`, `for_each_ordered`) are not available.
pub fn from_iterable<I>(iterable: I) -> IterableIter<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Send,
    I::Item: Send,
{
    IterableIter {
        iter: iterable.into_iter(),
    }
}

pub struct IterableIter<I: Iterator> {
    iter: I,
}

impl<I> ParallelIterator for IterableIter<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        let producer = IterableProducer {
            buffer: Vec::new(),
            source: Some(self.iter.peekable()),
            chunk: config::split_policy().min_split_size,
        };
        bridge_unindexed(producer, consumer)
    }
}

/// Either a buffered chunk (a leaf, `source` is `None`) or the not yet
/// consumed remainder of the stream.
struct IterableProducer<I: Iterator> {
    buffer: Vec<I::Item>,
    source: Option<Peekable<I>>,
    chunk: usize,
}

impl<I> UnindexedProducer for IterableProducer<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn split(mut self) -> (Self, Option<Self>) {
        let mut source = match self.source.take() {
            Some(source) => source,
            // A buffered chunk cannot be split further.
            None => return (self, None),
        };

        let mut buffer = Vec::new();
        buffer.extend(source.by_ref().take(self.chunk));
        let left = IterableProducer {
            buffer,
            source: None,
            chunk: self.chunk,
        };
        if source.peek().is_some() {
            let right = IterableProducer {
                buffer: Vec::new(),
                source: Some(source),
                chunk: self.chunk,
            };
            (left, Some(right))
        } else {
            (left, None)
        }
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        let folder = folder.consume_iter(self.buffer);
        match self.source {
            Some(source) => folder.consume_iter(source),
            None => folder,
        }
    }
}
