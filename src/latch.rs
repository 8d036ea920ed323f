//! One-shot latches used to signal job completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::registry::Registry;

/// Set exactly once; probed or awaited by the thread that owns the job.
pub(crate) trait Latch {
    fn set(&self);
}

/// A latch probed from inside the pool's help-while-waiting loop.
///
/// Setting it also pokes the registry's condvar so that a thread parked in
/// `Registry::wait_until` re-checks the probe.
pub(crate) struct SpinLatch {
    flag: AtomicBool,
    registry: Arc<Registry>,
}

impl SpinLatch {
    pub(crate) fn new(registry: Arc<Registry>) -> SpinLatch {
        SpinLatch {
            flag: AtomicBool::new(false),
            registry,
        }
    }

    #[inline]
    pub(crate) fn probe(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Latch for SpinLatch {
    fn set(&self) {
        self.flag.store(true, Ordering::Release);
        self.registry.tickle();
    }
}

/// A blocking latch for callers outside the pool: the external thread that
/// injected the root job sleeps here until a worker completes it.
pub(crate) struct LockLatch {
    done: Mutex<bool>,
    signal: Condvar,
}

impl LockLatch {
    pub(crate) fn new() -> LockLatch {
        LockLatch {
            done: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    pub(crate) fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.signal.wait(&mut done);
        }
    }
}

impl Latch for LockLatch {
    fn set(&self) {
        let mut done = self.done.lock();
        *done = true;
        self.signal.notify_all();
    }
}
