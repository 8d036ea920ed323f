//! The `for_each` terminals.

use super::plumbing::{Consumer, Folder, NoopReducer, UnindexedConsumer};
use super::{BoundedParallelIterator, ParallelIterator};

pub(super) fn for_each<I, OP>(pi: I, op: &OP)
where
    I: ParallelIterator,
    OP: Fn(I::Item) + Sync,
{
    let consumer = ForEachConsumer { op };
    pi.drive_unindexed(consumer)
}

/// Ordered variant: the pipeline runs in parallel, the side effect runs
/// sequentially over the materialised results in source order.
pub(super) fn for_each_ordered<I, OP>(pi: I, mut op: OP)
where
    I: BoundedParallelIterator,
    OP: FnMut(I::Item),
{
    for item in pi.collect() {
        op(item);
    }
}

struct ForEachConsumer<'f, OP> {
    op: &'f OP,
}

impl<'f, T, OP> Consumer<T> for ForEachConsumer<'f, OP>
where
    OP: Fn(T) + Sync,
{
    type Folder = Self;
    type Reducer = NoopReducer;
    type Result = ();

    fn split_at(self, _index: usize) -> (Self, Self, NoopReducer) {
        (
            ForEachConsumer { op: self.op },
            ForEachConsumer { op: self.op },
            NoopReducer,
        )
    }

    fn into_folder(self) -> Self {
        self
    }

    fn full(&self) -> bool {
        false
    }
}

impl<'f, T, OP> UnindexedConsumer<T> for ForEachConsumer<'f, OP>
where
    OP: Fn(T) + Sync,
{
    fn split(&self) -> Self {
        ForEachConsumer { op: self.op }
    }

    fn reducer(&self) -> NoopReducer {
        NoopReducer
    }
}

impl<'f, T, OP> Folder<T> for ForEachConsumer<'f, OP>
where
    OP: Fn(T) + Sync,
{
    type Result = ();

    fn consume(self, item: T) -> Self {
        (self.op)(item);
        self
    }

    fn consume_iter<I>(self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(self.op);
        self
    }

    fn complete(self) {}

    fn full(&self) -> bool {
        false
    }
}
