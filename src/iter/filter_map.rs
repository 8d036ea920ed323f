//! The `filter_map` adapter.

use super::plumbing::{Consumer, Folder, UnindexedConsumer};
use super::{BoundedParallelIterator, ParallelIterator};

pub struct FilterMap<I, F> {
    base: I,
    filter_op: F,
}

impl<I, F> FilterMap<I, F> {
    pub(super) fn new(base: I, filter_op: F) -> FilterMap<I, F> {
        FilterMap { base, filter_op }
    }
}

impl<I, F, R> ParallelIterator for FilterMap<I, F>
where
    I: ParallelIterator,
    F: Fn(I::Item) -> Option<R> + Sync + Send,
    R: Send,
{
    type Item = R;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<R>,
    {
        let consumer = FilterMapConsumer::new(consumer, &self.filter_op);
        self.base.drive_unindexed(consumer)
    }
}

impl<I, F, R> BoundedParallelIterator for FilterMap<I, F>
where
    I: BoundedParallelIterator,
    F: Fn(I::Item) -> Option<R> + Sync + Send,
    R: Send,
{
    fn upper_bound(&self) -> usize {
        self.base.upper_bound()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<R>,
    {
        let consumer = FilterMapConsumer::new(consumer, &self.filter_op);
        self.base.drive(consumer)
    }
}

///////////////////////////////////////////////////////////////////////////
// Consumer implementation

struct FilterMapConsumer<'f, C, F> {
    base: C,
    filter_op: &'f F,
}

impl<'f, C, F> FilterMapConsumer<'f, C, F> {
    fn new(base: C, filter_op: &'f F) -> Self {
        FilterMapConsumer { base, filter_op }
    }
}

impl<'f, T, R, C, F> Consumer<T> for FilterMapConsumer<'f, C, F>
where
    C: Consumer<R>,
    F: Fn(T) -> Option<R> + Sync,
{
    type Folder = FilterMapFolder<'f, C::Folder, F>;
    type Reducer = C::Reducer;
    type Result = C::Result;

    fn split_at(self, index: usize) -> (Self, Self, Self::Reducer) {
        let (left, right, reducer) = self.base.split_at(index);
        (
            FilterMapConsumer::new(left, self.filter_op),
            FilterMapConsumer::new(right, self.filter_op),
            reducer,
        )
    }

    fn into_folder(self) -> Self::Folder {
        FilterMapFolder {
            base: self.base.into_folder(),
            filter_op: self.filter_op,
        }
    }

    fn full(&self) -> bool {
        self.base.full()
    }
}

impl<'f, T, R, C, F> UnindexedConsumer<T> for FilterMapConsumer<'f, C, F>
where
    C: UnindexedConsumer<R>,
    F: Fn(T) -> Option<R> + Sync,
{
    fn split(&self) -> Self {
        FilterMapConsumer::new(self.base.split(), self.filter_op)
    }

    fn reducer(&self) -> Self::Reducer {
        self.base.reducer()
    }
}

struct FilterMapFolder<'f, C, F> {
    base: C,
    filter_op: &'f F,
}

impl<'f, T, R, C, F> Folder<T> for FilterMapFolder<'f, C, F>
where
    C: Folder<R>,
    F: Fn(T) -> Option<R>,
{
    type Result = C::Result;

    fn consume(self, item: T) -> Self {
        if let Some(mapped) = (self.filter_op)(item) {
            FilterMapFolder {
                base: self.base.consume(mapped),
                filter_op: self.filter_op,
            }
        } else {
            self
        }
    }

    fn consume_iter<I>(self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let FilterMapFolder { base, filter_op } = self;
        FilterMapFolder {
            base: base.consume_iter(iter.into_iter().filter_map(filter_op)),
            filter_op,
        }
    }

    fn complete(self) -> C::Result {
        self.base.complete()
    }

    fn full(&self) -> bool {
        self.base.full()
    }
}
