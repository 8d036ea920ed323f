//! Data-parallel iterators over a fixed worker pool.
//!
//! `fastiter` takes an indexable or streamable collection, recursively
//! splits it into contiguous chunks, runs a user-supplied pipeline of
//! transformations and filters over the chunks in parallel, and recombines
//! the partial results. It is aimed at CPU-bound bulk computations where
//! the per-element work is non-trivial and the collection is large enough
//! to amortise scheduling overhead.
//!
//! ```
//! use fastiter::prelude::*;
//!
//! let squares: Vec<i64> = fastiter::from_range(0, 10, 1).map(|x| x * x).collect();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
//!
//! let evens = fastiter::from_range(0, 1_000_000, 1).filter(|x| x % 2 == 0).count();
//! assert_eq!(evens, 500_000);
//! ```
//!
//! Parallelism comes from a process-wide pool sized by
//! `FASTITER_NUM_THREADS` (or the host CPU count), resizable with
//! [`set_num_threads`]. The bridge splits work while chunks stay above
//! [`set_min_split_size`] and spawns only in the top
//! [`set_max_split_depth`] levels of the recursion, which bounds the
//! number of in-flight tasks well below the pool size.
//!
//! Results are deterministic for ordered operations (`collect`,
//! `for_each_ordered`) and for unordered reductions whose combine is
//! associative and commutative; float sums may vary by rounding across
//! thread counts.

pub mod iter;
pub mod prelude;

mod config;
mod job;
mod latch;
mod registry;
mod unwind;

pub use crate::config::{
    current_num_threads, set_max_split_depth, set_min_split_size, set_num_threads, ConfigError,
};
pub use crate::iter::{
    from_iterable, from_range, from_sequence, BoundedParallelIterator, IntoParallelIterator,
    ParallelIterator,
};
