//! Process-wide configuration: worker count, split policy, and the lazily
//! created global pool.

use std::env;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use thiserror::Error;

use crate::registry::Registry;

/// Environment variable consulted once, at first use.
const NUM_THREADS_ENV: &str = "FASTITER_NUM_THREADS";

const DEFAULT_MIN_SPLIT_SIZE: usize = 10_000;

/// Errors reported by the configuration setters, before any work is spawned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("number of threads must be positive")]
    NumThreadsZero,
    #[error("minimum split size must be positive")]
    MinSplitSizeZero,
    #[error("maximum split depth must be at least 2")]
    MaxSplitDepthTooSmall,
}

struct GlobalState {
    num_threads: usize,
    min_split_size: usize,
    depth_override: Option<usize>,
    registry: Option<Arc<Registry>>,
}

impl GlobalState {
    fn from_env() -> GlobalState {
        let num_threads = match env::var(NUM_THREADS_ENV) {
            Ok(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => {
                    debug!("using {} worker threads ({})", n, NUM_THREADS_ENV);
                    n
                }
                _ => {
                    warn!("ignoring invalid {}={:?}", NUM_THREADS_ENV, value);
                    num_cpus::get()
                }
            },
            Err(_) => num_cpus::get(),
        };
        GlobalState {
            num_threads,
            min_split_size: DEFAULT_MIN_SPLIT_SIZE,
            depth_override: None,
            registry: None,
        }
    }

    fn max_split_depth(&self) -> usize {
        self.depth_override
            .unwrap_or_else(|| default_split_depth(self.num_threads))
    }
}

static GLOBAL: Lazy<Mutex<GlobalState>> = Lazy::new(|| Mutex::new(GlobalState::from_env()));

/// `clamp(floor(log2(num_threads)) + 1, 2, 4)`: a balanced recursion to
/// depth `d` spawns at most `2^d` leaves, so capping at 4 bounds the leaf
/// count at 16 and keeps the set of concurrently awaited jobs well below
/// any realistic pool size.
pub(crate) fn default_split_depth(num_threads: usize) -> usize {
    let log = if num_threads <= 1 {
        0
    } else {
        num_threads.ilog2() as usize
    };
    (log + 1).clamp(2, 4)
}

/// The number of worker threads the next parallel computation will use.
pub fn current_num_threads() -> usize {
    GLOBAL.lock().num_threads
}

/// Resize the worker pool. The current pool (if any) is asked to drain and
/// shut down; the replacement is created lazily, so the new size takes
/// effect for subsequent computations.
pub fn set_num_threads(num_threads: usize) -> Result<(), ConfigError> {
    if num_threads == 0 {
        return Err(ConfigError::NumThreadsZero);
    }
    let mut global = GLOBAL.lock();
    global.num_threads = num_threads;
    if let Some(old) = global.registry.take() {
        old.terminate();
    }
    Ok(())
}

/// Set the length below which the bridge stops splitting and processes a
/// chunk sequentially. Also the buffer size used when splitting unindexed
/// sources.
pub fn set_min_split_size(min_split_size: usize) -> Result<(), ConfigError> {
    if min_split_size == 0 {
        return Err(ConfigError::MinSplitSizeZero);
    }
    GLOBAL.lock().min_split_size = min_split_size;
    Ok(())
}

/// Override the recursion depth at which parallel spawning stops. The
/// default is derived from the thread count; an explicit override survives
/// later `set_num_threads` calls.
pub fn set_max_split_depth(max_split_depth: usize) -> Result<(), ConfigError> {
    if max_split_depth < 2 {
        return Err(ConfigError::MaxSplitDepthTooSmall);
    }
    GLOBAL.lock().depth_override = Some(max_split_depth);
    Ok(())
}

/// The split policy a single bridge invocation runs under, captured in one
/// load so a concurrent setter cannot tear it mid-recursion.
#[derive(Copy, Clone, Debug)]
pub(crate) struct SplitPolicy {
    pub(crate) min_split_size: usize,
    pub(crate) max_split_depth: usize,
}

pub(crate) fn split_policy() -> SplitPolicy {
    let global = GLOBAL.lock();
    SplitPolicy {
        min_split_size: global.min_split_size,
        max_split_depth: global.max_split_depth(),
    }
}

/// The global pool, created on first use.
pub(crate) fn global_registry() -> Arc<Registry> {
    let mut global = GLOBAL.lock();
    if let Some(registry) = &global.registry {
        return registry.clone();
    }
    let registry = Registry::new(global.num_threads);
    global.registry = Some(registry.clone());
    registry
}

#[cfg(test)]
pub(crate) static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParallelIterator;

    #[test]
    fn split_depth_follows_thread_count() {
        assert_eq!(default_split_depth(1), 2);
        assert_eq!(default_split_depth(2), 2);
        assert_eq!(default_split_depth(3), 2);
        assert_eq!(default_split_depth(4), 3);
        assert_eq!(default_split_depth(8), 4);
        assert_eq!(default_split_depth(32), 4);
    }

    #[test]
    fn setters_reject_out_of_range_arguments() {
        assert_eq!(set_num_threads(0), Err(ConfigError::NumThreadsZero));
        assert_eq!(set_min_split_size(0), Err(ConfigError::MinSplitSizeZero));
        assert_eq!(set_max_split_depth(0), Err(ConfigError::MaxSplitDepthTooSmall));
        assert_eq!(set_max_split_depth(1), Err(ConfigError::MaxSplitDepthTooSmall));
    }

    #[test]
    fn num_threads_defaults_positive() {
        assert!(current_num_threads() > 0);
    }

    #[test]
    fn set_num_threads_is_idempotent() {
        let _guard = CONFIG_TEST_LOCK.lock();
        let original = current_num_threads();

        set_num_threads(3).unwrap();
        let first = crate::from_range(0, 1000, 1).sum::<i64>();
        set_num_threads(3).unwrap();
        let second = crate::from_range(0, 1000, 1).sum::<i64>();
        assert_eq!(first, second);
        assert_eq!(current_num_threads(), 3);

        set_num_threads(original).unwrap();
    }
}
