//! Slice reads, writes and deletions on the ring.

use crate::error::{Error, Result};
use crate::list::ring::Ring;
use crate::list::LinkedSequence;
use crate::sequence::{check_stepped_len, MutableSequence, Sequence, SliceableSequence};
use crate::slice::{ResolvedSlice, SliceSpec};
use std::mem;
use tracing::debug;

impl<T> Ring<T> {
    /// Slots addressed by `slice`, in slice order.
    ///
    /// Seeks once to the first index, then walks `step` nodes at a time.
    fn slice_ids(&self, slice: ResolvedSlice) -> Vec<usize> {
        let count = slice.addressed();
        let mut ids = Vec::with_capacity(count);
        if count == 0 {
            return ids;
        }
        let step = slice.step();
        let mut current = self.seek(slice.first() as usize);
        ids.push(current);
        for _ in 1..count {
            current = self.walk(current, step);
            ids.push(current);
        }
        ids
    }

    /// Replace the logical range `start..end` with `values`.
    ///
    /// A non-empty assignment at the front keeps the anchor node, which takes
    /// the first value, the same way [`Ring::insert`] does at index 0.
    fn splice(&mut self, start: usize, end: usize, values: Vec<T>) {
        let range = SliceSpec::from(start as isize..end as isize);
        let mut removed = self.slice_ids(range.resolve(self.len()));
        let mut values = values.into_iter();
        let front = if start == 0 { self.anchor() } else { None };
        if let Some(anchor) = front {
            // an empty assignment at the front falls through to plain deletion
            if let Some(first) = values.next() {
                let old = mem::replace(&mut self.node_mut(anchor).value, first);
                // a replaced head is dropped, an untouched one moves behind the new values
                let displaced = if removed.first() == Some(&anchor) {
                    removed.swap_remove(0);
                    None
                } else {
                    Some(old)
                };
                for id in removed {
                    self.detach(id);
                }
                let next = self.next_of(anchor);
                for value in values.chain(displaced) {
                    self.insert_before(next, value);
                }
                return;
            }
        }
        for id in removed {
            self.detach(id);
        }
        if start == self.len() {
            for value in values {
                self.push_back(value);
            }
            return;
        }
        let next = self.seek(start);
        for value in values {
            self.insert_before(next, value);
        }
    }
}

impl<T> LinkedSequence<T> {
    /// Returns a new sequence holding clones of the addressed elements.
    ///
    /// Out-of-range bounds clip silently; any non-zero step works,
    /// including negative ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{LinkedSequence, SliceSpec};
    ///
    /// let seq = LinkedSequence::from_iter(0..10);
    /// assert_eq!(seq.get_slice(2..5), [2, 3, 4]);
    /// assert_eq!(seq.get_slice(-3..), [7, 8, 9]);
    /// assert_eq!(seq.get_slice(SliceSpec::from(..).step_by(-3)), [9, 6, 3, 0]);
    /// assert!(seq.get_slice(20..30).is_empty());
    /// ```
    pub fn get_slice(&self, spec: impl Into<SliceSpec>) -> LinkedSequence<T>
    where
        T: Clone,
    {
        let spec = spec.into();
        self.with_ring(|ring| {
            let ids = ring.slice_ids(spec.resolve(ring.len()));
            let ring: Ring<T> = ids.into_iter().map(|id| ring.node(id).value.clone()).collect();
            LinkedSequence::from_ring(ring)
        })
    }

    /// Replaces the addressed elements with `values`.
    ///
    /// With a unit step, the addressed range is replaced as a whole and may
    /// shrink or grow; an empty range is a pure insertion. With any other
    /// step, `values` must hold exactly one value per addressed position,
    /// otherwise [`Error::LengthMismatch`] is returned and nothing changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{Error, LinkedSequence, SliceSpec};
    ///
    /// let seq = LinkedSequence::from_iter(0..6);
    /// seq.set_slice(1..4, [9]).unwrap();
    /// assert_eq!(seq, [0, 9, 4, 5]);
    ///
    /// seq.set_slice(SliceSpec::from(..).step_by(2), [1, 1]).unwrap();
    /// assert_eq!(seq, [1, 9, 1, 5]);
    ///
    /// let err = seq.set_slice(SliceSpec::from(..).step_by(2), [1]).unwrap_err();
    /// assert_eq!(err, Error::LengthMismatch { expected: 2, actual: 1 });
    /// ```
    pub fn set_slice<I>(&self, spec: impl Into<SliceSpec>, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let spec = spec.into();
        let values: Vec<T> = values.into_iter().collect();
        self.with_ring_mut(|ring| {
            let resolved = spec.resolve(ring.len());
            match resolved.as_range() {
                Some(range) => {
                    debug!(
                        start = range.start,
                        end = range.end,
                        replacement = values.len(),
                        "splicing linked sequence"
                    );
                    ring.splice(range.start, range.end, values);
                }
                None => {
                    check_stepped_len(resolved.addressed(), values.len())?;
                    let ids = ring.slice_ids(resolved);
                    for (id, value) in ids.into_iter().zip(values) {
                        ring.node_mut(id).value = value;
                    }
                }
            }
            Ok(())
        })
    }

    /// Removes exactly the addressed elements.
    ///
    /// If the anchor is removed, the next surviving node takes over.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{LinkedSequence, SliceSpec};
    ///
    /// let seq = LinkedSequence::from_iter(0..8);
    /// seq.delete_slice(SliceSpec::from(..).step_by(3));
    /// assert_eq!(seq, [1, 2, 4, 5, 7]);
    /// seq.delete_slice(..);
    /// assert!(seq.is_empty());
    /// ```
    pub fn delete_slice(&self, spec: impl Into<SliceSpec>) {
        let spec = spec.into();
        self.with_ring_mut(|ring| {
            let ids = ring.slice_ids(spec.resolve(ring.len()));
            for id in ids {
                ring.detach(id);
            }
        })
    }

    /// Reads `count` elements around the ring, starting at logical index
    /// `start` and moving `step` nodes between reads.
    ///
    /// Unlike [`LinkedSequence::get_slice`], nothing is clipped: the read
    /// cycles through the ring, so a count larger than the length revisits
    /// elements. `start` is taken modulo the length. The only failure is
    /// reading from an empty sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3]);
    /// assert_eq!(seq.ring_slice(0, 7, 1).unwrap(), [1, 2, 3, 1, 2, 3, 1]);
    /// assert_eq!(seq.ring_slice(-1, 4, -2).unwrap(), [3, 1, 2, 3]);
    /// ```
    pub fn ring_slice(&self, start: isize, count: usize, step: isize) -> Result<LinkedSequence<T>>
    where
        T: Clone,
    {
        self.with_ring(|ring| {
            let len = ring.len();
            if count == 0 {
                return Ok(LinkedSequence::new());
            }
            if len == 0 {
                return Err(Error::OutOfRange { index: start, len });
            }
            let step = step % len as isize;
            let mut current = ring.seek(start.rem_euclid(len as isize) as usize);
            let mut values = Ring::new();
            for _ in 0..count {
                values.push_back(ring.node(current).value.clone());
                current = ring.walk(current, step);
            }
            Ok(LinkedSequence::from_ring(values))
        })
    }
}

impl<T: Clone> Sequence for LinkedSequence<T> {
    type Item = T;

    fn len(&self) -> usize {
        LinkedSequence::len(self)
    }

    fn get(&self, index: isize) -> Result<T> {
        LinkedSequence::get(self, index)
    }
}

impl<T: Clone> MutableSequence for LinkedSequence<T> {
    fn set(&mut self, index: isize, value: T) -> Result<()> {
        LinkedSequence::set(self, index, value).map(drop)
    }

    fn remove(&mut self, index: isize) -> Result<T> {
        LinkedSequence::remove(self, index)
    }

    fn insert(&mut self, index: isize, value: T) -> Result<()> {
        LinkedSequence::insert(self, index, value);
        Ok(())
    }

    fn push(&mut self, value: T) -> Result<()> {
        LinkedSequence::push(self, value);
        Ok(())
    }
}

impl<T: Clone> SliceableSequence for LinkedSequence<T> {
    fn get_slice(&self, spec: SliceSpec) -> Result<Vec<T>> {
        Ok(LinkedSequence::get_slice(self, spec).into_vec())
    }

    fn set_slice(&mut self, spec: SliceSpec, values: Vec<T>) -> Result<()> {
        LinkedSequence::set_slice(self, spec, values)
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        LinkedSequence::delete_slice(self, spec);
        Ok(())
    }
}
