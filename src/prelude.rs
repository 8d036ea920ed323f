//! Import everything needed to build and run parallel pipelines:
//!
//! ```
//! use fastiter::prelude::*;
//! ```

pub use crate::iter::{
    from_iterable, from_range, from_sequence, BoundedParallelIterator, IntoParallelIterator,
    ParallelIterator,
};
