//! The `reduce` terminal.

use super::plumbing::{Consumer, Folder, Reducer, UnindexedConsumer};
use super::ParallelIterator;

pub(super) fn reduce<I, OP, ID>(pi: I, identity: ID, op: OP) -> I::Item
where
    I: ParallelIterator,
    OP: Fn(I::Item, I::Item) -> I::Item + Sync,
    ID: Fn() -> I::Item + Sync,
{
    let consumer = ReduceConsumer {
        identity: &identity,
        op: &op,
    };
    pi.drive_unindexed(consumer)
}

struct ReduceConsumer<'r, ID, OP> {
    identity: &'r ID,
    op: &'r OP,
}

impl<'r, T, ID, OP> Consumer<T> for ReduceConsumer<'r, ID, OP>
where
    T: Send,
    ID: Fn() -> T + Sync,
    OP: Fn(T, T) -> T + Sync,
{
    type Folder = ReduceFolder<'r, T, OP>;
    type Reducer = Self;
    type Result = T;

    fn split_at(self, _index: usize) -> (Self, Self, Self) {
        (
            ReduceConsumer {
                identity: self.identity,
                op: self.op,
            },
            ReduceConsumer {
                identity: self.identity,
                op: self.op,
            },
            self,
        )
    }

    fn into_folder(self) -> Self::Folder {
        ReduceFolder {
            // One identity per sequential chunk.
            item: (self.identity)(),
            op: self.op,
        }
    }

    fn full(&self) -> bool {
        false
    }
}

impl<'r, T, ID, OP> UnindexedConsumer<T> for ReduceConsumer<'r, ID, OP>
where
    T: Send,
    ID: Fn() -> T + Sync,
    OP: Fn(T, T) -> T + Sync,
{
    fn split(&self) -> Self {
        ReduceConsumer {
            identity: self.identity,
            op: self.op,
        }
    }

    fn reducer(&self) -> Self {
        ReduceConsumer {
            identity: self.identity,
            op: self.op,
        }
    }
}

impl<'r, T, ID, OP> Reducer<T> for ReduceConsumer<'r, ID, OP>
where
    OP: Fn(T, T) -> T,
{
    fn reduce(self, left: T, right: T) -> T {
        (self.op)(left, right)
    }
}

struct ReduceFolder<'r, T, OP> {
    item: T,
    op: &'r OP,
}

impl<'r, T, OP> Folder<T> for ReduceFolder<'r, T, OP>
where
    OP: Fn(T, T) -> T,
{
    type Result = T;

    fn consume(self, item: T) -> Self {
        ReduceFolder {
            item: (self.op)(self.item, item),
            op: self.op,
        }
    }

    fn consume_iter<I>(self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        ReduceFolder {
            item: iter.into_iter().fold(self.item, self.op),
            op: self.op,
        }
    }

    fn complete(self) -> T {
        self.item
    }

    fn full(&self) -> bool {
        false
    }
}
