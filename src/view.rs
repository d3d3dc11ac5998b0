//! A window onto another sequence.
//!
//! A [`SlicedView`] borrows a sequence mutably and exposes the elements
//! addressed by a [`SliceSpec`] as a sequence of their own, without copying.
//! The window is resolved against the length of the underlying sequence at
//! every access, so it follows the sequence as it grows or shrinks.
//!
//! ```
//! use altseq::{MutableSequence, Sequence, SliceSpec, SlicedView};
//!
//! let mut data: Vec<i32> = (0..10).collect();
//! let mut odd = SlicedView::new(&mut data, SliceSpec::from(1..).step_by(2));
//! assert_eq!(odd.len(), 5);
//! assert_eq!(odd.get(2), Ok(5));
//!
//! odd.set(0, 100).unwrap();
//! assert_eq!(data[1], 100);
//! ```

use crate::error::{normalize_index, Error, Result};
use crate::sequence::{MutableSequence, Sequence, SliceableSequence};
use crate::slice::{ResolvedSlice, SliceSpec};
use std::fmt;

/// A mutable window `(start, stop, step)` over a borrowed sequence.
///
/// Views only accept non-negative indices; a negative index is
/// [`Error::Unsupported`]. Slice reads and slice deletion go through the
/// window, slice assignment is unsupported.
pub struct SlicedView<'a, S: ?Sized> {
    data: &'a mut S,
    window: SliceSpec,
}

impl<'a, S> SlicedView<'a, S>
where
    S: SliceableSequence + ?Sized,
{
    pub fn new(data: &'a mut S, window: impl Into<SliceSpec>) -> Self {
        Self {
            data,
            window: window.into(),
        }
    }

    /// A view over every element of `data`.
    pub fn full(data: &'a mut S) -> Self {
        Self::new(data, SliceSpec::full())
    }

    pub fn window(&self) -> SliceSpec {
        self.window
    }

    /// The window resolved against the current length of the underlying
    /// sequence.
    pub fn resolved(&self) -> ResolvedSlice {
        self.window.resolve(self.data.len())
    }

    /// A view of this view's elements addressed by `window`.
    ///
    /// Both windows are composed into a single window over the underlying
    /// sequence, resolved against its current length.
    ///
    /// ```
    /// use altseq::{SliceSpec, SlicedView};
    ///
    /// let mut data: Vec<i32> = (0..20).collect();
    /// let mut evens = SlicedView::new(&mut data, SliceSpec::from(..).step_by(2));
    /// let tail = evens.subview(SliceSpec::from(..-4).step_by(-1));
    /// assert_eq!(tail.to_vec(), vec![18, 16, 14]);
    /// ```
    pub fn subview(&mut self, window: impl Into<SliceSpec>) -> SlicedView<'_, S> {
        let window = compose(&self.resolved(), &window.into());
        SlicedView {
            data: &mut *self.data,
            window,
        }
    }

    /// Gives the borrowed sequence back.
    pub fn into_inner(self) -> &'a mut S {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = S::Item> + '_ {
        self.resolved().map(move |index| {
            self.data
                .get(index as isize)
                .expect("resolved index is in bounds")
        })
    }

    pub fn to_vec(&self) -> Vec<S::Item> {
        self.iter().collect()
    }

    /// Maps a view index to an index of the underlying sequence.
    fn underlying(&self, index: isize) -> Result<usize> {
        if index < 0 {
            return Err(Error::unsupported("negative index on a sliced view"));
        }
        let resolved = self.resolved();
        let at = normalize_index(index, resolved.addressed())?;
        Ok((resolved.first() + at as isize * resolved.step()) as usize)
    }
}

/// Composes `inner`, relative to the elements addressed by `outer`, into a
/// window over the sequence `outer` was resolved against.
fn compose(outer: &ResolvedSlice, inner: &SliceSpec) -> SliceSpec {
    let nested = inner.resolve(outer.addressed());
    if nested.is_empty() {
        return SliceSpec::from(0..0);
    }
    // `nested.first()` addresses an element, so this is an index
    let start = outer.first() + nested.first() * outer.step();
    if nested.addressed() == 1 {
        return SliceSpec::from(start..start + 1);
    }
    let Some(step) = outer.step().checked_mul(nested.step()) else {
        return SliceSpec::from(0..0);
    };
    let stop = (nested.addressed() as isize)
        .checked_mul(step)
        .and_then(|span| start.checked_add(span));
    // a negative stop would count from the end
    let stop = stop.filter(|&stop| stop >= 0);
    SliceSpec::try_new(Some(start), stop, Some(step)).expect("composed step is non-zero")
}

impl<S> Sequence for SlicedView<'_, S>
where
    S: SliceableSequence + ?Sized,
{
    type Item = S::Item;

    fn len(&self) -> usize {
        self.resolved().addressed()
    }

    fn get(&self, index: isize) -> Result<S::Item> {
        let at = self.underlying(index)?;
        self.data.get(at as isize)
    }
}

impl<S> MutableSequence for SlicedView<'_, S>
where
    S: SliceableSequence + ?Sized,
{
    fn set(&mut self, index: isize, value: S::Item) -> Result<()> {
        let at = self.underlying(index)?;
        self.data.set(at as isize, value)
    }

    fn remove(&mut self, index: isize) -> Result<S::Item> {
        let at = self.underlying(index)?;
        self.data.remove(at as isize)
    }

    /// Inserts into the underlying sequence at the position of the view
    /// element `index`; past the end of the view, at the position one step
    /// after its last element.
    fn insert(&mut self, index: isize, value: S::Item) -> Result<()> {
        if index < 0 {
            return Err(Error::unsupported("negative index on a sliced view"));
        }
        let resolved = self.resolved();
        let position = (index as usize).min(resolved.addressed()) as isize;
        let at = position
            .saturating_mul(resolved.step())
            .saturating_add(resolved.first())
            .clamp(0, self.data.len() as isize);
        self.data.insert(at, value)
    }
}

impl<S> SliceableSequence for SlicedView<'_, S>
where
    S: SliceableSequence + ?Sized,
{
    fn set_slice(&mut self, _spec: SliceSpec, _values: Vec<S::Item>) -> Result<()> {
        Err(Error::unsupported("slice assignment on a sliced view"))
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        let window = self.resolved();
        let mut doomed: Vec<usize> = spec
            .resolve(window.addressed())
            .map(|at| (window.first() + at as isize * window.step()) as usize)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for at in doomed {
            self.data.remove(at as isize)?;
        }
        Ok(())
    }
}

impl<S> fmt::Debug for SlicedView<'_, S>
where
    S: SliceableSequence + ?Sized,
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
