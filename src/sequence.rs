//! The sequence contract shared by every container in this crate.
//!
//! [`Sequence`], [`MutableSequence`] and [`SliceableSequence`] split the
//! contract into reading, scalar mutation and slicing. The slice operations
//! have default implementations written in terms of the scalar ones, so an
//! adapter only needs the scalar operations to become fully sliceable. The
//! core containers override the defaults with structure-aware versions.
//!
//! Indices are `isize`: negative indices count from the end.
//!
//! ```
//! use altseq::{Sequence, SliceableSequence, SliceSpec};
//!
//! let mut data = vec![0, 1, 2, 3, 4, 5];
//! assert_eq!(Sequence::get(&data, -1), Ok(5));
//!
//! data.set_slice(SliceSpec::from(..).step_by(2), vec![10, 12, 14]).unwrap();
//! assert_eq!(data, vec![10, 1, 12, 3, 14, 5]);
//! ```

use crate::error::{clamp_insert_index, normalize_index, Error, Result};
use crate::slice::SliceSpec;

/// A readable, indexable sequence.
pub trait Sequence {
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`, or [`Error::OutOfRange`].
    fn get(&self, index: isize) -> Result<Self::Item>;
}

/// A sequence supporting scalar mutation.
///
/// Containers that forbid some of these operations return
/// [`Error::Unsupported`].
pub trait MutableSequence: Sequence {
    fn set(&mut self, index: isize, value: Self::Item) -> Result<()>;

    /// Removes and returns the element at `index`.
    fn remove(&mut self, index: isize) -> Result<Self::Item>;

    /// Inserts `value` before the element at `index`.
    fn insert(&mut self, index: isize, value: Self::Item) -> Result<()>;

    fn push(&mut self, value: Self::Item) -> Result<()> {
        let len = self.len();
        self.insert(len as isize, value)
    }
}

/// A sequence supporting slice reads, slice assignment and slice deletion.
///
/// Slice operations never fail on out-of-range bounds. The only failure of
/// a well-formed call is a length mismatch in stepped assignment.
pub trait SliceableSequence: MutableSequence {
    fn get_slice(&self, spec: SliceSpec) -> Result<Vec<Self::Item>> {
        spec.resolve(self.len())
            .map(|index| self.get(index as isize))
            .collect()
    }

    /// Replaces the addressed elements with `values`.
    ///
    /// With a unit step the range may shrink or grow. With any other step
    /// `values` must have exactly one value per addressed position.
    fn set_slice(&mut self, spec: SliceSpec, values: Vec<Self::Item>) -> Result<()> {
        let resolved = spec.resolve(self.len());
        match resolved.as_range() {
            Some(range) => {
                for _ in range.clone() {
                    self.remove(range.start as isize)?;
                }
                for (offset, value) in values.into_iter().enumerate() {
                    self.insert((range.start + offset) as isize, value)?;
                }
            }
            None => {
                check_stepped_len(resolved.addressed(), values.len())?;
                for (index, value) in resolved.zip(values) {
                    self.set(index as isize, value)?;
                }
            }
        }
        Ok(())
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        // Descending order keeps the remaining indices valid.
        for index in spec.resolve(self.len()).descending() {
            self.remove(index as isize)?;
        }
        Ok(())
    }
}

pub(crate) fn check_stepped_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { expected, actual });
    }
    Ok(())
}

impl<T: Clone> Sequence for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: isize) -> Result<T> {
        let index = normalize_index(index, self.as_slice().len())?;
        Ok(self[index].clone())
    }
}

impl<T: Clone> MutableSequence for Vec<T> {
    fn set(&mut self, index: isize, value: T) -> Result<()> {
        let index = normalize_index(index, self.as_slice().len())?;
        self[index] = value;
        Ok(())
    }

    fn remove(&mut self, index: isize) -> Result<T> {
        let index = normalize_index(index, self.as_slice().len())?;
        Ok(Vec::remove(self, index))
    }

    fn insert(&mut self, index: isize, value: T) -> Result<()> {
        let index = clamp_insert_index(index, self.as_slice().len());
        Vec::insert(self, index, value);
        Ok(())
    }

    fn push(&mut self, value: T) -> Result<()> {
        Vec::push(self, value);
        Ok(())
    }
}

impl<T: Clone> SliceableSequence for Vec<T> {
    fn set_slice(&mut self, spec: SliceSpec, values: Vec<T>) -> Result<()> {
        let resolved = spec.resolve(self.as_slice().len());
        match resolved.as_range() {
            Some(range) => {
                self.splice(range, values);
            }
            None => {
                check_stepped_len(resolved.addressed(), values.len())?;
                for (index, value) in resolved.zip(values) {
                    self[index] = value;
                }
            }
        }
        Ok(())
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        let resolved = spec.resolve(self.as_slice().len());
        match resolved.as_range() {
            Some(range) => {
                self.drain(range);
            }
            None => {
                for index in resolved.descending() {
                    Vec::remove(self, index);
                }
            }
        }
        Ok(())
    }
}
