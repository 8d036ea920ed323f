//! Type-erased units of work.
//!
//! A `StackJob` lives in the stack frame of the `join` (or `in_worker` call)
//! that created it. The queue holds only an erased `JobRef` pointing into
//! that frame; the frame does not return until the job's latch is set, which
//! is what keeps the pointer valid.

use std::any::Any;
use std::cell::UnsafeCell;

use crate::latch::Latch;
use crate::unwind;

pub(crate) trait Job {
    /// # Safety
    ///
    /// `this` must point at a live instance of the implementing type, and
    /// must be called at most once.
    unsafe fn execute(this: *const ());
}

/// An erased, queueable pointer to a `Job`.
#[derive(Copy, Clone)]
pub(crate) struct JobRef {
    pointer: *const (),
    execute_fn: unsafe fn(*const ()),
}

// JobRef moves between threads by design; the pointed-to StackJob is kept
// alive by the joining frame and its fields are synchronized by the latch.
unsafe impl Send for JobRef {}

impl JobRef {
    pub(crate) unsafe fn new<T>(data: *const T) -> JobRef
    where
        T: Job,
    {
        JobRef {
            pointer: data as *const (),
            execute_fn: <T as Job>::execute,
        }
    }

    #[inline]
    pub(crate) unsafe fn execute(self) {
        (self.execute_fn)(self.pointer)
    }
}

pub(crate) enum JobResult<T> {
    None,
    Ok(T),
    Panic(Box<dyn Any + Send>),
}

impl<T> JobResult<T> {
    /// Unwrap the stored outcome, re-raising a captured panic on the
    /// calling thread.
    pub(crate) fn into_return_value(self) -> T {
        match self {
            // Only reachable if the latch was set without executing, which
            // never happens.
            JobResult::None => unreachable!("job latch set before execution"),
            JobResult::Ok(value) => value,
            JobResult::Panic(payload) => unwind::resume_unwinding(payload),
        }
    }
}

/// A job allocated in the enqueuing frame, with slots for the closure and
/// its eventual result.
pub(crate) struct StackJob<L, F, R>
where
    L: Latch,
    F: FnOnce() -> R + Send,
    R: Send,
{
    pub(crate) latch: L,
    func: UnsafeCell<Option<F>>,
    result: UnsafeCell<JobResult<R>>,
}

impl<L, F, R> StackJob<L, F, R>
where
    L: Latch,
    F: FnOnce() -> R + Send,
    R: Send,
{
    pub(crate) fn new(func: F, latch: L) -> StackJob<L, F, R> {
        StackJob {
            latch,
            func: UnsafeCell::new(Some(func)),
            result: UnsafeCell::new(JobResult::None),
        }
    }

    /// # Safety
    ///
    /// The returned `JobRef` must be executed (or dropped unexecuted only
    /// after the owning frame has been released from its wait).
    pub(crate) unsafe fn as_job_ref(&self) -> JobRef {
        JobRef::new(self)
    }

    /// Take the result; call only after the latch has been set.
    pub(crate) fn into_result(self) -> R {
        self.result.into_inner().into_return_value()
    }

    /// Reclaim the closure from a job that was never queued.
    pub(crate) fn into_func(self) -> F {
        // Invariant: only called when execution never started.
        self.func.into_inner().unwrap()
    }
}

impl<L, F, R> Job for StackJob<L, F, R>
where
    L: Latch,
    F: FnOnce() -> R + Send,
    R: Send,
{
    unsafe fn execute(this: *const ()) {
        let this = &*(this as *const Self);
        // Invariant: each JobRef is popped and executed exactly once.
        let func = (*this.func.get()).take().unwrap();
        (*this.result.get()) = match unwind::halt_unwinding(func) {
            Ok(value) => JobResult::Ok(value),
            Err(payload) => JobResult::Panic(payload),
        };
        this.latch.set();
    }
}
