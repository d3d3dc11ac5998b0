//! Slice descriptors with the usual clipping arithmetic.
//!
//! A [`SliceSpec`] is a `(start, stop, step)` triple whose bounds may be
//! omitted or negative. Resolving it against a length with
//! [`SliceSpec::resolve`] never fails: out-of-range bounds clip silently and
//! the result is a [`ResolvedSlice`], which iterates over the addressed
//! indices.
//!
//! ```
//! use altseq::SliceSpec;
//!
//! let spec = SliceSpec::from(..).step_by(-2);
//! let indices: Vec<usize> = spec.resolve(7).collect();
//! assert_eq!(indices, vec![6, 4, 2, 0]);
//!
//! let clipped = SliceSpec::from(-100..100).resolve(3);
//! assert_eq!(clipped.as_range(), Some(0..3));
//! ```

use crate::error::{Error, Result};
use std::iter::FusedIterator;
use std::num::NonZeroIsize;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// A slice descriptor: optional bounds and a non-zero step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SliceSpec {
    start: Option<isize>,
    stop: Option<isize>,
    step: Option<NonZeroIsize>,
}

impl SliceSpec {
    /// The slice addressing every element, `[::]`.
    pub const fn full() -> Self {
        Self {
            start: None,
            stop: None,
            step: None,
        }
    }

    /// Build a slice descriptor, rejecting a zero step.
    pub fn try_new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Result<Self> {
        let step = match step {
            None => None,
            Some(step) => Some(
                NonZeroIsize::new(step)
                    .ok_or_else(|| Error::invalid_arg("step", "slice step cannot be zero"))?,
            ),
        };
        Ok(Self { start, stop, step })
    }

    /// Replace the step.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero, like [`Iterator::step_by`].
    pub fn step_by(self, step: isize) -> Self {
        let step = NonZeroIsize::new(step).expect("slice step cannot be zero");
        Self {
            step: Some(step),
            ..self
        }
    }

    pub fn start(&self) -> Option<isize> {
        self.start
    }

    pub fn stop(&self) -> Option<isize> {
        self.stop
    }

    pub fn step(&self) -> isize {
        self.step.map_or(1, NonZeroIsize::get)
    }

    /// Clip the descriptor against a sequence of length `len`.
    pub fn resolve(&self, len: usize) -> ResolvedSlice {
        let len = len as isize;
        let step = self.step();
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clip = |bound: isize| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let start = self.start.map_or(if step < 0 { upper } else { lower }, clip);
        let stop = self.stop.map_or(if step < 0 { lower } else { upper }, clip);
        // `unsigned_abs` because `-isize::MIN` overflows
        let count = if step > 0 && start < stop {
            (stop - start - 1) as usize / step.unsigned_abs() + 1
        } else if step < 0 && stop < start {
            (start - stop - 1) as usize / step.unsigned_abs() + 1
        } else {
            0
        };
        ResolvedSlice {
            start,
            stop,
            step,
            count,
            taken: 0,
        }
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl From<Range<isize>> for SliceSpec {
    fn from(range: Range<isize>) -> Self {
        Self {
            start: Some(range.start),
            stop: Some(range.end),
            step: None,
        }
    }
}

impl From<RangeInclusive<isize>> for SliceSpec {
    fn from(range: RangeInclusive<isize>) -> Self {
        let (start, end) = range.into_inner();
        // `-1..=-1` would otherwise turn into the empty `-1..0`
        // and `..=isize::MAX` has no exclusive bound
        let stop = if end == -1 { None } else { end.checked_add(1) };
        Self {
            start: Some(start),
            stop,
            step: None,
        }
    }
}

impl From<RangeFrom<isize>> for SliceSpec {
    fn from(range: RangeFrom<isize>) -> Self {
        Self {
            start: Some(range.start),
            stop: None,
            step: None,
        }
    }
}

impl From<RangeTo<isize>> for SliceSpec {
    fn from(range: RangeTo<isize>) -> Self {
        Self {
            start: None,
            stop: Some(range.end),
            step: None,
        }
    }
}

/// A slice descriptor resolved against a concrete length.
///
/// Iterating yields the addressed indices in slice order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSlice {
    start: isize,
    stop: isize,
    step: isize,
    count: usize,
    taken: usize,
}

impl ResolvedSlice {
    /// First addressed index (may equal the length when nothing is addressed).
    pub fn first(&self) -> isize {
        self.start
    }

    pub fn step(&self) -> isize {
        self.step
    }

    /// Number of addressed indices.
    pub fn addressed(&self) -> usize {
        self.count
    }

    /// Returns `true` if no index is addressed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// For a unit step, the contiguous half-open range of addressed indices.
    ///
    /// An empty range still carries the insertion point, which is what
    /// slice assignment uses for pure insertion.
    pub fn as_range(&self) -> Option<Range<usize>> {
        if self.step != 1 {
            return None;
        }
        let start = self.start as usize;
        Some(start..start + self.count)
    }

    /// The addressed indices sorted in descending order.
    pub fn descending(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.clone().collect();
        if self.step > 0 {
            indices.reverse();
        }
        indices
    }
}

impl Iterator for ResolvedSlice {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.taken == self.count {
            return None;
        }
        let index = self.start + self.taken as isize * self.step;
        self.taken += 1;
        Some(index as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.count - self.taken;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for ResolvedSlice {}

impl FusedIterator for ResolvedSlice {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference slicing written directly against the definition.
    fn reference(len: usize, start: Option<isize>, stop: Option<isize>, step: isize) -> Vec<usize> {
        let n = len as isize;
        let adjust = |b: isize, lo: isize, hi: isize| {
            if b < 0 {
                (b + n).max(lo)
            } else {
                b.min(hi)
            }
        };
        let mut out = Vec::new();
        if step > 0 {
            let mut i = start.map_or(0, |b| adjust(b, 0, n));
            let end = stop.map_or(n, |b| adjust(b, 0, n));
            while i < end {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        } else {
            let mut i = start.map_or(n - 1, |b| adjust(b, -1, n - 1));
            let end = stop.map_or(-1, |b| adjust(b, -1, n - 1));
            while i > end {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        }
        out
    }

    #[test]
    fn resolve_defaults() {
        let all: Vec<usize> = SliceSpec::full().resolve(4).collect();
        assert_eq!(all, vec![0, 1, 2, 3]);
        let rev: Vec<usize> = SliceSpec::full().step_by(-1).resolve(4).collect();
        assert_eq!(rev, vec![3, 2, 1, 0]);
        assert!(SliceSpec::full().resolve(0).is_empty());
        assert!(SliceSpec::full().step_by(-1).resolve(0).is_empty());
    }

    #[test]
    fn resolve_table() {
        let cases: &[(Option<isize>, Option<isize>, isize, &[usize])] = &[
            (Some(0), Some(5), 1, &[0, 1, 2, 3, 4]),
            (Some(-5), None, 1, &[5, 6, 7, 8, 9]),
            (Some(1), None, 1, &[1, 2, 3, 4, 5, 6, 7, 8, 9]),
            (None, None, 2, &[0, 2, 4, 6, 8]),
            (None, None, -1, &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]),
            (Some(0), Some(15), 4, &[0, 4, 8]),
            (Some(8), Some(2), -3, &[8, 5]),
            (Some(100), None, -4, &[9, 5, 1]),
            (Some(5), Some(2), 1, &[]),
        ];
        for &(start, stop, step, expected) in cases {
            let spec = SliceSpec::try_new(start, stop, Some(step)).unwrap();
            let got: Vec<usize> = spec.resolve(10).collect();
            assert_eq!(got, expected, "slice {:?}:{:?}:{}", start, stop, step);
        }
    }

    #[test]
    fn zero_step_rejected() {
        assert!(matches!(
            SliceSpec::try_new(None, None, Some(0)),
            Err(Error::InvalidArgument { name: "step", .. })
        ));
    }

    #[test]
    fn ranges_convert() {
        assert_eq!(SliceSpec::from(2..5).resolve(10).as_range(), Some(2..5));
        assert_eq!(SliceSpec::from(..3).resolve(10).as_range(), Some(0..3));
        assert_eq!(SliceSpec::from(-3..).resolve(10).as_range(), Some(7..10));
        assert_eq!(SliceSpec::from(1..=3).resolve(10).as_range(), Some(1..4));
        assert_eq!(SliceSpec::from(-2..=-1).resolve(10).as_range(), Some(8..10));
        // an empty range keeps its insertion point
        assert_eq!(SliceSpec::from(6..2).resolve(10).as_range(), Some(6..6));
        assert_eq!(SliceSpec::from(..).step_by(2).resolve(10).as_range(), None);
    }

    #[test]
    fn extreme_steps() {
        let back = SliceSpec::try_new(None, None, Some(isize::MIN)).unwrap();
        assert_eq!(back.resolve(5).collect::<Vec<_>>(), vec![4]);
        assert!(back.resolve(0).is_empty());
        let forward = SliceSpec::from(..).step_by(isize::MAX);
        assert_eq!(forward.resolve(5).collect::<Vec<_>>(), vec![0]);
        assert_eq!(
            SliceSpec::from(isize::MIN..isize::MAX).step_by(isize::MIN).resolve(3).addressed(),
            0
        );
        assert_eq!(SliceSpec::from(1..=isize::MAX).resolve(4).as_range(), Some(1..4));
    }

    #[test]
    fn descending_order() {
        assert_eq!(SliceSpec::from(..).step_by(3).resolve(10).descending(), vec![9, 6, 3, 0]);
        assert_eq!(SliceSpec::from(..).step_by(-3).resolve(10).descending(), vec![9, 6, 3, 0]);
    }

    proptest! {
        #[test]
        fn matches_reference(
            len in 0usize..40,
            start in proptest::option::of(-50isize..50),
            stop in proptest::option::of(-50isize..50),
            step in prop_oneof![-7isize..=-1, 1isize..=7, Just(isize::MIN), Just(isize::MAX)],
        ) {
            let spec = SliceSpec::try_new(start, stop, Some(step)).unwrap();
            let resolved = spec.resolve(len);
            let expected = reference(len, start, stop, step);
            prop_assert_eq!(resolved.addressed(), expected.len());
            prop_assert_eq!(resolved.collect::<Vec<_>>(), expected);
        }
    }
}
