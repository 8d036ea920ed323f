//! The `count` terminal.

use super::plumbing::{Consumer, Folder, Reducer, UnindexedConsumer};
use super::ParallelIterator;

pub(super) fn count<I>(pi: I) -> usize
where
    I: ParallelIterator,
{
    pi.drive_unindexed(CountConsumer)
}

struct CountConsumer;

impl<T> Consumer<T> for CountConsumer {
    type Folder = CountFolder;
    type Reducer = Self;
    type Result = usize;

    fn split_at(self, _index: usize) -> (Self, Self, Self) {
        (CountConsumer, CountConsumer, CountConsumer)
    }

    fn into_folder(self) -> CountFolder {
        CountFolder { count: 0 }
    }

    fn full(&self) -> bool {
        false
    }
}

impl<T> UnindexedConsumer<T> for CountConsumer {
    fn split(&self) -> Self {
        CountConsumer
    }

    fn reducer(&self) -> Self {
        CountConsumer
    }
}

impl Reducer<usize> for CountConsumer {
    fn reduce(self, left: usize, right: usize) -> usize {
        left + right
    }
}

struct CountFolder {
    count: usize,
}

impl<T> Folder<T> for CountFolder {
    type Result = usize;

    fn consume(self, _item: T) -> Self {
        CountFolder {
            count: self.count + 1,
        }
    }

    fn consume_iter<I>(self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        CountFolder {
            count: self.count + iter.into_iter().count(),
        }
    }

    fn complete(self) -> usize {
        self.count
    }

    fn full(&self) -> bool {
        false
    }
}
