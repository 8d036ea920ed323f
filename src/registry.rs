//! The worker pool.
//!
//! A `Registry` owns a fixed set of worker threads and a central queue of
//! injected jobs. There is deliberately no per-thread deque and no stealing:
//! the bridge bounds how many jobs can be awaited at once via its depth cap,
//! and any thread that awaits a latch services the queue itself while it
//! waits, so every injected job makes progress even on a one-thread (or
//! zero-thread) pool.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::job::{JobRef, StackJob};
use crate::latch::{LockLatch, SpinLatch};
use crate::unwind;

///////////////////////////////////////////////////////////////////////////

pub(crate) struct Registry {
    state: Mutex<RegistryState>,
    work_available: Condvar,
    num_threads: AtomicUsize,
}

struct RegistryState {
    injected_jobs: Vec<JobRef>,
    terminated: bool,
}

impl Registry {
    /// Start `num_threads` workers. If the host refuses to spawn some (or
    /// all) of them the pool still functions, falling back to sequential
    /// execution when no worker could be started.
    pub(crate) fn new(num_threads: usize) -> Arc<Registry> {
        let registry = Arc::new(Registry {
            state: Mutex::new(RegistryState {
                injected_jobs: Vec::new(),
                terminated: false,
            }),
            work_available: Condvar::new(),
            num_threads: AtomicUsize::new(0),
        });

        let mut started = 0;
        for index in 0..num_threads {
            let registry = registry.clone();
            let spawned = thread::Builder::new()
                .name(format!("fastiter-worker-{}", index))
                .spawn(move || main_loop(registry));
            match spawned {
                Ok(_) => started += 1,
                Err(err) => warn!("failed to spawn worker thread {}: {}", index, err),
            }
        }
        registry.num_threads.store(started, Ordering::Relaxed);
        if started == 0 && num_threads > 0 {
            static SEQUENTIAL_FALLBACK: Once = Once::new();
            SEQUENTIAL_FALLBACK.call_once(|| {
                warn!("no worker threads could be started; running sequentially");
            });
        } else {
            debug!("worker pool started with {} threads", started);
        }

        registry
    }

    pub(crate) fn num_threads(&self) -> usize {
        self.num_threads.load(Ordering::Relaxed)
    }

    /// Queue a job for execution by any thread. Callers must be prepared
    /// to execute the job themselves while awaiting it (`wait_until`), as
    /// a terminated pool no longer has workers.
    pub(crate) fn inject(&self, job: JobRef) {
        let mut state = self.state.lock();
        state.injected_jobs.push(job);
        drop(state);
        self.work_available.notify_all();
    }

    /// Queue a job whose caller will block without helping. Refused once
    /// the pool is terminated: workers only exit when the queue is empty
    /// and the terminated flag is set, both checked under this same lock,
    /// so an accepted job is guaranteed to be drained.
    pub(crate) fn inject_root(&self, job: JobRef) -> bool {
        let mut state = self.state.lock();
        if state.terminated {
            return false;
        }
        state.injected_jobs.push(job);
        drop(state);
        self.work_available.notify_all();
        true
    }

    /// Wake threads parked in `wait_until` or `main_loop` so they re-check
    /// their latch. Taking the lock orders the wake-up after any in-flight
    /// probe, ruling out a lost notification.
    pub(crate) fn tickle(&self) {
        let _state = self.state.lock();
        self.work_available.notify_all();
    }

    /// Block until `latch` is set, executing queued jobs in the meantime.
    ///
    /// Servicing the queue here is what makes the recursive bridge
    /// deadlock-free: the job this thread is waiting on is either already
    /// running elsewhere or still in the queue, where this loop will find
    /// and run it.
    pub(crate) fn wait_until(&self, latch: &SpinLatch) {
        let mut state = self.state.lock();
        loop {
            if latch.probe() {
                return;
            }
            if let Some(job) = state.injected_jobs.pop() {
                drop(state);
                unsafe { job.execute() };
                state = self.state.lock();
            } else {
                self.work_available.wait(&mut state);
            }
        }
    }

    /// Ask the workers to exit once the queue is drained. Jobs injected
    /// afterwards by in-flight computations are still completed, by the
    /// threads awaiting them.
    pub(crate) fn terminate(&self) {
        let mut state = self.state.lock();
        state.terminated = true;
        drop(state);
        self.work_available.notify_all();
        debug!("worker pool terminating");
    }
}

///////////////////////////////////////////////////////////////////////////
// Worker threads

thread_local! {
    static WORKER_THREAD: Cell<bool> = Cell::new(false);
}

fn main_loop(registry: Arc<Registry>) {
    WORKER_THREAD.with(|w| w.set(true));

    let mut state = registry.state.lock();
    loop {
        if let Some(job) = state.injected_jobs.pop() {
            drop(state);
            // Panics are captured into the job's result slot, so a worker
            // never unwinds out of this loop.
            unsafe { job.execute() };
            state = registry.state.lock();
        } else if state.terminated {
            return;
        } else {
            registry.work_available.wait(&mut state);
        }
    }
}

///////////////////////////////////////////////////////////////////////////
// Entry points

/// Run `op` with access to the pool: directly if this thread is already a
/// worker (or the pool has no workers at all), otherwise by injecting it
/// and blocking until a worker completes it.
pub(crate) fn in_worker<OP, R>(registry: &Arc<Registry>, op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    if WORKER_THREAD.with(|w| w.get()) || registry.num_threads() == 0 {
        return op();
    }

    let job = StackJob::new(op, LockLatch::new());
    if unsafe { registry.inject_root(job.as_job_ref()) } {
        job.latch.wait();
        job.into_result()
    } else {
        // The pool was replaced under us; run on the calling thread.
        job.into_func()()
    }
}

/// Execute two closures, potentially in parallel, returning both results.
///
/// The second closure is queued on the pool while the first runs on the
/// current thread; the current thread then helps the pool until the queued
/// half has settled. A panic in either half is re-raised here, left half
/// first, and only after both halves have settled (the queued job borrows
/// this stack frame).
pub(crate) fn join<A, RA, B, RB>(registry: &Arc<Registry>, oper_a: A, oper_b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    RA: Send,
    B: FnOnce() -> RB + Send,
    RB: Send,
{
    let job_b = StackJob::new(oper_b, SpinLatch::new(registry.clone()));
    unsafe { registry.inject(job_b.as_job_ref()) };

    let status_a = unwind::halt_unwinding(oper_a);
    registry.wait_until(&job_b.latch);

    match status_a {
        Ok(result_a) => (result_a, job_b.into_result()),
        Err(payload) => unwind::resume_unwinding(payload),
    }
}

///////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_returns_both_results() {
        let registry = Registry::new(2);
        let (a, b) = join(&registry, || 1 + 1, || "two");
        assert_eq!(a, 2);
        assert_eq!(b, "two");
        registry.terminate();
    }

    #[test]
    fn join_nests() {
        let registry = Registry::new(2);
        let handle = registry.clone();
        let total = in_worker(&registry, || {
            let (a, (b, c)) = join(
                &handle,
                || 1,
                || join(&handle, || 2, || 3),
            );
            a + b + c
        });
        assert_eq!(total, 6);
        registry.terminate();
    }

    #[test]
    fn single_thread_pool_makes_progress() {
        let registry = Registry::new(1);
        let handle = registry.clone();
        let result = in_worker(&registry, || {
            let (a, b) = join(&handle, || 10, || 20);
            a + b
        });
        assert_eq!(result, 30);
        registry.terminate();
    }

    #[test]
    fn zero_thread_pool_runs_inline() {
        let registry = Registry::new(0);
        let handle = registry.clone();
        let result = in_worker(&registry, || {
            let (a, b) = join(&handle, || 7, || 8);
            a * b
        });
        assert_eq!(result, 56);
        registry.terminate();
    }

    #[test]
    fn left_panic_wins() {
        let registry = Registry::new(2);
        let handle = registry.clone();
        let outcome = unwind::halt_unwinding(|| {
            in_worker(&registry, || {
                join::<_, (), _, ()>(
                    &handle,
                    || panic!("left failure"),
                    || panic!("right failure"),
                )
            })
        });
        let payload = outcome.err().expect("join should propagate the panic");
        let message = payload.downcast_ref::<&str>().copied();
        assert_eq!(message, Some("left failure"));
        registry.terminate();
    }

    #[test]
    fn right_panic_propagates() {
        let registry = Registry::new(2);
        let handle = registry.clone();
        let outcome = unwind::halt_unwinding(|| {
            in_worker(&registry, || {
                join(&handle, || 1, || -> i32 { panic!("right failure") })
            })
        });
        assert!(outcome.is_err());
        registry.terminate();
    }
}
