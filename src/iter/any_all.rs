//! The short-circuiting `any`/`all` terminals.
//!
//! Both share one `AtomicBool` across every sibling consumer and folder.
//! The first chunk to reach a verdict latches it; every other folder sees
//! the latch through `full()` at its next element and stops, and the
//! bridge stops splitting branches that have not started.

use std::sync::atomic::{AtomicBool, Ordering};

use super::plumbing::{Consumer, Folder, NoopReducer, UnindexedConsumer};
use super::ParallelIterator;

pub(super) fn any<I, P>(pi: I, predicate: P) -> bool
where
    I: ParallelIterator,
    P: Fn(I::Item) -> bool + Sync,
{
    let found = AtomicBool::new(false);
    let consumer = AnyConsumer {
        found: &found,
        predicate: &predicate,
    };
    pi.drive_unindexed(consumer);
    found.load(Ordering::Relaxed)
}

pub(super) fn all<I, P>(pi: I, predicate: P) -> bool
where
    I: ParallelIterator,
    P: Fn(I::Item) -> bool + Sync,
{
    let failed = AtomicBool::new(false);
    let consumer = AllConsumer {
        failed: &failed,
        predicate: &predicate,
    };
    pi.drive_unindexed(consumer);
    !failed.load(Ordering::Relaxed)
}

///////////////////////////////////////////////////////////////////////////

struct AnyConsumer<'p, P> {
    found: &'p AtomicBool,
    predicate: &'p P,
}

impl<'p, T, P> Consumer<T> for AnyConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    type Folder = Self;
    type Reducer = NoopReducer;
    type Result = ();

    fn split_at(self, _index: usize) -> (Self, Self, NoopReducer) {
        (
            AnyConsumer {
                found: self.found,
                predicate: self.predicate,
            },
            AnyConsumer {
                found: self.found,
                predicate: self.predicate,
            },
            NoopReducer,
        )
    }

    fn into_folder(self) -> Self {
        self
    }

    fn full(&self) -> bool {
        self.found.load(Ordering::Relaxed)
    }
}

impl<'p, T, P> UnindexedConsumer<T> for AnyConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    fn split(&self) -> Self {
        AnyConsumer {
            found: self.found,
            predicate: self.predicate,
        }
    }

    fn reducer(&self) -> NoopReducer {
        NoopReducer
    }
}

impl<'p, T, P> Folder<T> for AnyConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    type Result = ();

    fn consume(self, item: T) -> Self {
        if (self.predicate)(item) {
            self.found.store(true, Ordering::Relaxed);
        }
        self
    }

    fn complete(self) {}

    fn full(&self) -> bool {
        self.found.load(Ordering::Relaxed)
    }
}

///////////////////////////////////////////////////////////////////////////

struct AllConsumer<'p, P> {
    failed: &'p AtomicBool,
    predicate: &'p P,
}

impl<'p, T, P> Consumer<T> for AllConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    type Folder = Self;
    type Reducer = NoopReducer;
    type Result = ();

    fn split_at(self, _index: usize) -> (Self, Self, NoopReducer) {
        (
            AllConsumer {
                failed: self.failed,
                predicate: self.predicate,
            },
            AllConsumer {
                failed: self.failed,
                predicate: self.predicate,
            },
            NoopReducer,
        )
    }

    fn into_folder(self) -> Self {
        self
    }

    fn full(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

impl<'p, T, P> UnindexedConsumer<T> for AllConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    fn split(&self) -> Self {
        AllConsumer {
            failed: self.failed,
            predicate: self.predicate,
        }
    }

    fn reducer(&self) -> NoopReducer {
        NoopReducer
    }
}

impl<'p, T, P> Folder<T> for AllConsumer<'p, P>
where
    P: Fn(T) -> bool + Sync,
{
    type Result = ();

    fn consume(self, item: T) -> Self {
        if !(self.predicate)(item) {
            self.failed.store(true, Ordering::Relaxed);
        }
        self
    }

    fn complete(self) {}

    fn full(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}
