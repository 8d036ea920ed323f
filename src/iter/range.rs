//! Parallel iteration over an arithmetic progression.

use std::ops::Range;

use super::plumbing::{bridge, Consumer, Producer, UnindexedConsumer};
use super::{BoundedParallelIterator, IntoParallelIterator, ParallelIterator};

/// A parallel iterator over `start, start + step, ...` up to (exclusive)
/// `stop`.
///
/// A step pointing away from `stop` yields an empty range, mirroring the
/// usual range semantics.
///
/// # Panics
///
/// Panics if `step` is zero.
pub fn from_range(start: i64, stop: i64, step: i64) -> RangeIter {
    assert!(step != 0, "from_range: step must be non-zero");
    RangeIter { start, stop, step }
}

#[derive(Copy, Clone, Debug)]
pub struct RangeIter {
    start: i64,
    stop: i64,
    step: i64,
}

impl IntoParallelIterator for Range<i64> {
    type Item = i64;
    type Iter = RangeIter;

    fn into_par_iter(self) -> RangeIter {
        RangeIter {
            start: self.start,
            stop: self.end,
            step: 1,
        }
    }
}

impl ParallelIterator for RangeIter {
    type Item = i64;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<i64>,
    {
        bridge(RangeProducer::from(self), consumer)
    }
}

impl BoundedParallelIterator for RangeIter {
    fn upper_bound(&self) -> usize {
        range_len(self.start, self.stop, self.step)
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: Consumer<i64>,
    {
        bridge(RangeProducer::from(self), consumer)
    }
}

/// Number of elements in the progression. Computed in `i128` so that spans
/// near the `i64` limits cannot overflow.
fn range_len(start: i64, stop: i64, step: i64) -> usize {
    let (start, stop, step) = (start as i128, stop as i128, step as i128);
    let span = if step > 0 { stop - start } else { start - stop };
    if span <= 0 {
        return 0;
    }
    let stride = step.abs();
    let len = (span + stride - 1) / stride;
    assert!(len <= usize::MAX as i128, "range length exceeds usize::MAX");
    len as usize
}

struct RangeProducer {
    start: i64,
    stop: i64,
    step: i64,
}

impl From<RangeIter> for RangeProducer {
    fn from(iter: RangeIter) -> RangeProducer {
        RangeProducer {
            start: iter.start,
            stop: iter.stop,
            step: iter.step,
        }
    }
}

impl Producer for RangeProducer {
    type Item = i64;
    type IntoIter = StepIter;

    fn len(&self) -> usize {
        range_len(self.start, self.stop, self.step)
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let len = self.len();
        assert!(
            index <= len,
            "split index {} out of range for length {}",
            index,
            len
        );
        // The element just past the left half, clamped into the range so
        // the boundary always fits in i64.
        let boundary = self.start as i128 + self.step as i128 * index as i128;
        let boundary = if self.step > 0 {
            boundary.min(self.stop as i128)
        } else {
            boundary.max(self.stop as i128)
        } as i64;
        (
            RangeProducer {
                start: self.start,
                stop: boundary,
                step: self.step,
            },
            RangeProducer {
                start: boundary,
                stop: self.stop,
                step: self.step,
            },
        )
    }

    fn into_iter(self) -> StepIter {
        StepIter {
            cursor: self.start,
            remaining: self.len(),
            step: self.step,
        }
    }
}

pub struct StepIter {
    cursor: i64,
    remaining: usize,
    step: i64,
}

impl Iterator for StepIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.cursor;
        self.remaining -= 1;
        // Advance only while another element exists; the last in-range
        // value plus step could overflow.
        if self.remaining > 0 {
            self.cursor += self.step;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StepIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(start: i64, stop: i64, step: i64) -> Vec<i64> {
        RangeProducer {
            start,
            stop,
            step,
        }
        .into_iter()
        .collect()
    }

    #[test]
    fn len_matches_progression() {
        assert_eq!(range_len(0, 10, 1), 10);
        assert_eq!(range_len(0, 10, 3), 4);
        assert_eq!(range_len(0, 10, 100), 1);
        assert_eq!(range_len(10, 0, -1), 10);
        assert_eq!(range_len(10, 0, -3), 4);
        assert_eq!(range_len(5, 5, 1), 0);
        assert_eq!(range_len(0, 10, -1), 0);
        assert_eq!(range_len(10, 0, 1), 0);
    }

    #[test]
    fn materialises_in_order() {
        assert_eq!(elements(0, 10, 3), vec![0, 3, 6, 9]);
        assert_eq!(elements(10, 0, -3), vec![10, 7, 4, 1]);
        assert_eq!(elements(3, 3, 1), Vec::<i64>::new());
    }

    #[test]
    fn split_preserves_concatenation() {
        for index in 0..=4 {
            let producer = RangeProducer {
                start: 0,
                stop: 10,
                step: 3,
            };
            let whole: Vec<i64> = elements(0, 10, 3);
            let (left, right) = producer.split_at(index);
            let mut joined: Vec<i64> = left.into_iter().collect();
            assert_eq!(joined.len(), index);
            joined.extend(right.into_iter());
            assert_eq!(joined, whole);
        }
    }

    #[test]
    fn split_handles_negative_step() {
        let producer = RangeProducer {
            start: 10,
            stop: 0,
            step: -3,
        };
        let (left, right) = producer.split_at(2);
        assert_eq!(left.into_iter().collect::<Vec<_>>(), vec![10, 7]);
        assert_eq!(right.into_iter().collect::<Vec<_>>(), vec![4, 1]);
    }

    #[test]
    #[should_panic(expected = "step must be non-zero")]
    fn zero_step_rejected() {
        from_range(0, 10, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn oversized_split_index_rejected() {
        let producer = RangeProducer {
            start: 0,
            stop: 4,
            step: 1,
        };
        producer.split_at(5);
    }
}
