use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

use parking_lot::ReentrantMutex;

use crate::error::{clamp_insert_index, normalize_index, Error, Result};
use crate::paged::pages::Pages;
use crate::sequence::{check_stepped_len, MutableSequence, Sequence, SliceableSequence};
use crate::slice::SliceSpec;
use tracing::trace;

pub use crate::paged::dirt::DirtLog;

mod dirt;
mod pages;

/// The page size used when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// The `PagedSequence` keeps its elements in pages of a nominal size, so
/// inserting or removing in the middle only shifts the elements of one
/// page.
///
/// Pages drift away from the nominal size as elements come and go. A sparse
/// [`DirtLog`] records the drift and corrects index resolution: with a clean
/// log, finding the page of an index is a division; otherwise it walks from
/// the page the division suggests.
///
/// Every operation takes `&self` and holds the sequence's reentrant lock
/// for its whole duration.
///
/// # Examples
///
/// ```
/// use altseq::PagedSequence;
///
/// let seq = PagedSequence::with_page_size(10).unwrap();
/// seq.extend(0..100);
/// assert_eq!(seq.page_count(), 10);
///
/// seq.remove(35).unwrap();
/// assert_eq!(seq.get(35), Ok(36));
/// assert_eq!(seq.dirt().entries(), &[(3, -1)]);
///
/// seq.set_slice(12..15, 0..9).unwrap();
/// assert_eq!(seq.get_slice(10..14), vec![10, 11, 0, 1]);
/// ```
pub struct PagedSequence<T> {
    pages: ReentrantMutex<RefCell<Pages<T>>>,
}

// private methods
impl<T> PagedSequence<T> {
    fn from_pages(pages: Pages<T>) -> Self {
        Self {
            pages: ReentrantMutex::new(RefCell::new(pages)),
        }
    }

    fn with_pages<R>(&self, f: impl FnOnce(&Pages<T>) -> R) -> R {
        let guard = self.pages.lock();
        let pages = guard.borrow();
        f(&pages)
    }

    fn with_pages_mut<R>(&self, f: impl FnOnce(&mut Pages<T>) -> R) -> R {
        let guard = self.pages.lock();
        let mut pages = guard.borrow_mut();
        let result = f(&mut pages);
        #[cfg(any(debug_assertions, feature = "checked"))]
        if let Err(err) = pages.check_invariants() {
            panic!("{}", err);
        }
        result
    }
}

impl<T> PagedSequence<T> {
    /// Create an empty `PagedSequence` with the default page size.
    pub fn new() -> Self {
        Self::from_pages(Pages::new(DEFAULT_PAGE_SIZE))
    }

    /// Create an empty `PagedSequence` with pages of `page_size` elements.
    ///
    /// A zero page size is rejected with [`Error::InvalidArgument`].
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        Self::builder().page_size(page_size).build()
    }

    /// Start configuring a `PagedSequence`.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::PagedSequence;
    ///
    /// let seq = PagedSequence::builder()
    ///     .page_size(4)
    ///     .extend(0..10)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(seq.page_count(), 3);
    /// assert_eq!(seq, (0..10).collect::<Vec<_>>());
    /// ```
    pub fn builder() -> PagedSequenceBuilder<T> {
        PagedSequenceBuilder::default()
    }

    pub fn page_size(&self) -> usize {
        self.with_pages(Pages::page_size)
    }

    /// The page size is fixed at construction: every call fails with
    /// [`Error::ImmutableParameter`], even one passing the current size.
    pub fn set_page_size(&self, page_size: usize) -> Result<()> {
        trace!(page_size, current = self.page_size(), "rejected page size change");
        Err(Error::ImmutableParameter { name: "page_size" })
    }

    pub fn page_count(&self) -> usize {
        self.with_pages(Pages::page_count)
    }

    /// A copy of the current dirt log.
    pub fn dirt(&self) -> DirtLog {
        self.with_pages(|pages| pages.dirt().clone())
    }

    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*d*) time, where *d* is the
    /// number of dirt log entries.
    pub fn len(&self) -> usize {
        self.with_pages(Pages::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves logical `index` to its `(page, offset)` location.
    pub fn locate(&self, index: isize) -> Result<(usize, usize)> {
        self.with_pages(|pages| pages.locate(normalize_index(index, pages.len())?))
    }

    /// Returns a clone of the element at `index`. Negative indices count
    /// from the end.
    pub fn get(&self, index: isize) -> Result<T>
    where
        T: Clone,
    {
        self.with_pages(|pages| {
            let at = normalize_index(index, pages.len())?;
            pages.get(at).cloned()
        })
    }

    /// Replaces the element at `index` and returns the previous value.
    pub fn set(&self, index: isize, value: T) -> Result<T> {
        self.with_pages_mut(|pages| {
            let at = normalize_index(index, pages.len())?;
            Ok(std::mem::replace(pages.get_mut(at)?, value))
        })
    }

    /// Applies `f` to the element at `index` and stores the result back at
    /// `index`.
    ///
    /// `f` works on a copy of the element, so it may call back into the
    /// sequence. The lock stays held until the value is stored, so other
    /// threads see the update as a single step.
    pub fn update<R>(&self, index: isize, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Clone,
    {
        let _guard = self.pages.lock();
        let mut value = self.get(index)?;
        let result = f(&mut value);
        self.with_pages_mut(|pages| {
            let at = normalize_index(index, pages.len())?;
            *pages.get_mut(at)? = value;
            Ok(result)
        })
    }

    /// Removes the element at `index` and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{Error, PagedSequence};
    ///
    /// let seq = PagedSequence::builder().page_size(10).extend(0..100).build().unwrap();
    /// assert_eq!(seq.remove(35), Ok(35));
    /// assert_eq!(seq.get(98), Ok(99));
    /// assert_eq!(seq.get(99), Err(Error::OutOfRange { index: 99, len: 99 }));
    /// ```
    pub fn remove(&self, index: isize) -> Result<T> {
        self.with_pages_mut(|pages| {
            let at = normalize_index(index, pages.len())?;
            pages.remove(at)
        })
    }

    /// Inserts `value` before the element currently at `index`, clamping
    /// `index` to `0..=len`.
    pub fn insert(&self, index: isize, value: T) {
        self.with_pages_mut(|pages| {
            let at = clamp_insert_index(index, pages.len());
            pages
                .insert(at, value)
                .expect("clamped insertion index is always in range");
        })
    }

    pub fn push(&self, value: T) {
        self.with_pages_mut(|pages| pages.push(value))
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop(&self) -> Option<T> {
        self.with_pages_mut(|pages| {
            let len = pages.len();
            if len == 0 {
                return None;
            }
            pages.remove(len - 1).ok()
        })
    }

    pub fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        self.with_pages_mut(|pages| {
            for value in iter {
                pages.push(value);
            }
        })
    }

    pub fn clear(&self) {
        self.with_pages_mut(Pages::clear)
    }

    /// Copies the addressed elements into a `Vec`.
    ///
    /// A unit-step slice is read page-wise: the tail of its first page,
    /// the whole pages in between and the head of its last page. Other
    /// steps read element by element.
    pub fn get_slice(&self, spec: impl Into<SliceSpec>) -> Vec<T>
    where
        T: Clone,
    {
        let spec = spec.into();
        self.with_pages(|pages| {
            let resolved = spec.resolve(pages.len());
            match resolved.as_range() {
                Some(range) => pages
                    .pieces(range)
                    .expect("resolved range is in bounds")
                    .concat(),
                None => resolved
                    .map(|index| pages.get(index).expect("resolved index is in bounds").clone())
                    .collect(),
            }
        })
    }

    /// Like [`PagedSequence::get_slice`], but returns a `PagedSequence`
    /// with the same page size. A unit-step slice keeps the page layout of
    /// the pieces it's read from.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::PagedSequence;
    ///
    /// let seq = PagedSequence::builder().page_size(10).extend(0..100).build().unwrap();
    /// let part = seq.get_slice_paged(25..35);
    /// assert_eq!(part.page_size(), 10);
    /// assert_eq!(part.page_count(), 2);
    /// part.remove(5).unwrap();
    /// assert_eq!(part, vec![25, 26, 27, 28, 29, 31, 32, 33, 34]);
    /// assert_eq!(seq.get(30), Ok(30));
    /// ```
    pub fn get_slice_paged(&self, spec: impl Into<SliceSpec>) -> PagedSequence<T>
    where
        T: Clone,
    {
        let spec = spec.into();
        let pages = self.with_pages(|pages| {
            let page_size = pages.page_size();
            let resolved = spec.resolve(pages.len());
            match resolved.as_range() {
                Some(range) => {
                    let pieces = pages.pieces(range).expect("resolved range is in bounds");
                    let pieces = pieces.into_iter().map(<[T]>::to_vec).collect();
                    Pages::from_pages(pieces, page_size)
                }
                None => {
                    let values = resolved
                        .map(|index| pages.get(index).expect("resolved index is in bounds").clone())
                        .collect();
                    Pages::from_vec(values, page_size)
                }
            }
        });
        PagedSequence::from_pages(pages)
    }

    /// Replaces the addressed elements with `values`.
    ///
    /// A unit-step assignment within one page is spliced in place. One
    /// spanning pages rebuilds the covered pages and then the dirt log.
    /// Other steps require exactly one value per addressed position and
    /// fail with [`Error::LengthMismatch`] before changing anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::PagedSequence;
    ///
    /// let seq = PagedSequence::builder().page_size(10).extend(0..100).build().unwrap();
    /// seq.set_slice(5..12, 200..220).unwrap();
    /// assert_eq!(seq.len(), 113);
    /// assert_eq!(seq.get_slice(3..7), vec![3, 4, 200, 201]);
    /// assert_eq!(seq.get_slice(23..27), vec![218, 219, 12, 13]);
    /// ```
    pub fn set_slice<I>(&self, spec: impl Into<SliceSpec>, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let spec = spec.into();
        let values: Vec<T> = values.into_iter().collect();
        self.with_pages_mut(|pages| {
            let resolved = spec.resolve(pages.len());
            match resolved.as_range() {
                Some(range) => pages.splice(range, values),
                None => {
                    check_stepped_len(resolved.addressed(), values.len())?;
                    for (index, value) in resolved.zip(values) {
                        *pages.get_mut(index)? = value;
                    }
                    Ok(())
                }
            }
        })
    }

    /// Removes exactly the addressed elements.
    pub fn delete_slice(&self, spec: impl Into<SliceSpec>) {
        let spec = spec.into();
        self.with_pages_mut(|pages| {
            let resolved = spec.resolve(pages.len());
            match resolved.as_range() {
                Some(range) => {
                    if !range.is_empty() {
                        pages
                            .splice(range, Vec::new())
                            .expect("resolved range is in bounds");
                    }
                }
                None => {
                    for index in resolved.descending() {
                        pages.remove(index).expect("resolved index is in bounds");
                    }
                }
            }
        })
    }

    /// Repaginates into nominal-size pages, leaving a clean dirt log.
    pub fn compact(&self) {
        self.with_pages_mut(Pages::compact)
    }

    /// Provides a forward iterator yielding clones of the elements.
    ///
    /// Like [`LinkedSequence::iter`](crate::LinkedSequence::iter) it locks
    /// the sequence for one step at a time.
    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone,
    {
        Iter {
            seq: self,
            index: 0,
            remaining: self.len(),
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.with_pages(|pages| pages.values().cloned().collect())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.pages.into_inner().into_inner().into_values()
    }

    /// Verify the dirt log against the pages. Always `Ok` unless there is a
    /// bug.
    pub fn check_invariants(&self) -> Result<()> {
        self.with_pages(Pages::check_invariants)
    }
}

/// Configures a [`PagedSequence`].
#[derive(Debug)]
pub struct PagedSequenceBuilder<T> {
    page_size: usize,
    values: Vec<T>,
}

impl<T> Default for PagedSequenceBuilder<T> {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            values: Vec::new(),
        }
    }
}

impl<T> PagedSequenceBuilder<T> {
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Initial elements, cut into nominal-size pages on build.
    pub fn extend<I: IntoIterator<Item = T>>(mut self, values: I) -> Self {
        self.values.extend(values);
        self
    }

    pub fn build(self) -> Result<PagedSequence<T>> {
        if self.page_size == 0 {
            return Err(Error::invalid_arg("page_size", "page size must be positive"));
        }
        Ok(PagedSequence::from_pages(Pages::from_vec(
            self.values,
            self.page_size,
        )))
    }
}

/// An iterator over clones of the elements of a `PagedSequence`.
///
/// It never yields more elements than the sequence held when it was
/// created, and stops early if the sequence shrinks below its position.
pub struct Iter<'a, T> {
    seq: &'a PagedSequence<T>,
    index: usize,
    remaining: usize,
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.seq.with_pages(|pages| pages.get(self.index).ok().cloned());
        match value {
            Some(value) => {
                self.index += 1;
                self.remaining -= 1;
                Some(value)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<T: Clone> FusedIterator for Iter<'_, T> {}

impl<T> Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter")
            .field("index", &self.index)
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<'a, T: Clone> IntoIterator for &'a PagedSequence<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for PagedSequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<T> FromIterator<T> for PagedSequence<T> {
    /// Collects into pages of [`DEFAULT_PAGE_SIZE`] elements.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PagedSequence::from_pages(Pages::from_vec(iter.into_iter().collect(), DEFAULT_PAGE_SIZE))
    }
}

impl<T> Extend<T> for PagedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        PagedSequence::extend(self, iter)
    }
}

impl<T> Default for PagedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for PagedSequence<T> {
    fn clone(&self) -> Self {
        PagedSequence::from_pages(self.with_pages(Pages::clone))
    }
}

impl<T: Debug> Debug for PagedSequence<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.with_pages(|pages| f.debug_list().entries(pages.values()).finish())
    }
}

impl<T: PartialEq + Clone> PartialEq for PagedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let theirs = other.to_vec();
        self == theirs.as_slice()
    }
}

impl<T: Eq + Clone> Eq for PagedSequence<T> {}

impl<T: PartialEq> PartialEq<[T]> for PagedSequence<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.with_pages(|pages| pages.len() == other.len() && pages.values().eq(other.iter()))
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for PagedSequence<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == *other.as_slice()
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for PagedSequence<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T: Clone> Sequence for PagedSequence<T> {
    type Item = T;

    fn len(&self) -> usize {
        PagedSequence::len(self)
    }

    fn get(&self, index: isize) -> Result<T> {
        PagedSequence::get(self, index)
    }
}

impl<T: Clone> MutableSequence for PagedSequence<T> {
    fn set(&mut self, index: isize, value: T) -> Result<()> {
        PagedSequence::set(self, index, value).map(drop)
    }

    fn remove(&mut self, index: isize) -> Result<T> {
        PagedSequence::remove(self, index)
    }

    fn insert(&mut self, index: isize, value: T) -> Result<()> {
        PagedSequence::insert(self, index, value);
        Ok(())
    }

    fn push(&mut self, value: T) -> Result<()> {
        PagedSequence::push(self, value);
        Ok(())
    }
}

impl<T: Clone> SliceableSequence for PagedSequence<T> {
    fn get_slice(&self, spec: SliceSpec) -> Result<Vec<T>> {
        Ok(PagedSequence::get_slice(self, spec))
    }

    fn set_slice(&mut self, spec: SliceSpec, values: Vec<T>) -> Result<()> {
        PagedSequence::set_slice(self, spec, values)
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        PagedSequence::delete_slice(self, spec);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn hundred() -> PagedSequence<i32> {
        PagedSequence::builder()
            .page_size(10)
            .extend(0..100)
            .build()
            .unwrap()
    }

    #[test]
    fn paged_single_item_access() {
        let seq = hundred();
        assert_eq!(seq.get(0), Ok(0));
        assert_eq!(seq.get(99), Ok(99));
        assert_eq!(seq.get(100), Err(Error::OutOfRange { index: 100, len: 100 }));
        assert_eq!(seq.get(35), Ok(35));
        assert_eq!(seq.get(-5), Ok(95));
        assert_eq!(seq.locate(35), Ok((3, 5)));
    }

    #[test]
    fn paged_single_item_deletion() {
        let seq = hundred();
        assert_eq!(seq.remove(35), Ok(35));
        assert_eq!(seq.get(35), Ok(36));
        assert_eq!(seq.get(39), Ok(40));
        assert_eq!(seq.get(49), Ok(50));
        assert_eq!(seq.get(98), Ok(99));
        assert!(seq.get(99).is_err());
        assert_eq!(seq.len(), 99);
    }

    #[test]
    fn paged_single_item_insertion() {
        let seq = hundred();
        seq.insert(48, -1);
        assert_eq!(seq.get(48), Ok(-1));
        assert_eq!(seq.get(49), Ok(48));
        assert_eq!(seq.get(50), Ok(49));
        seq.insert(48, -2);
        assert_eq!(seq.get(50), Ok(48));
        assert_eq!(seq.dirt().entries(), &[(4, 2)]);
        assert_eq!(seq.len(), 102);
    }

    #[test]
    fn paged_slice_access() {
        let seq = hundred();
        assert_eq!(seq.get_slice(25..35), (25..35).collect::<Vec<_>>());
        assert_eq!(seq.get_slice(SliceSpec::from(0..15).step_by(4)), vec![0, 4, 8, 12]);
        assert_eq!(seq.get_slice(-5..), vec![95, 96, 97, 98, 99]);
        assert!(seq.get_slice(100..).is_empty());
    }

    #[test]
    fn paged_slice_deletion() {
        let seq = hundred();
        seq.remove(98).unwrap();
        assert_eq!(seq.get_slice(-5..), vec![94, 95, 96, 97, 99]);
        seq.remove(88).unwrap();
        assert_eq!(
            seq.get_slice(-15..),
            vec![83, 84, 85, 86, 87, 89, 90, 91, 92, 93, 94, 95, 96, 97, 99]
        );
    }

    #[test]
    fn paged_intra_page_slice_assignment() {
        let seq = hundred();
        seq.set_slice(12..15, 0..9).unwrap();
        assert_eq!(
            seq.get_slice(..30),
            vec![
                0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 0, 1, 2, 3, 4, 5, 6, 7, 8, 15, 16, 17, 18,
                19, 20, 21, 22, 23
            ]
        );
        assert_eq!(seq.page_count(), 10);
        assert_eq!(seq.dirt().entries(), &[(1, 6)]);
    }

    #[test]
    fn paged_multi_page_slice_assignment() {
        let seq = hundred();
        seq.set_slice(5..35, 100..160).unwrap();
        let mut expected: Vec<i32> = (0..5).collect();
        expected.extend(100..160);
        expected.extend(35..100);
        assert_eq!(seq, expected);
        seq.check_invariants().unwrap();

        seq.set_slice(5..85, 100..110).unwrap();
        expected.splice(5..85, 100..110);
        assert_eq!(seq, expected);
        assert_eq!(seq.len(), expected.len());
    }

    #[test]
    fn paged_emptying_and_refilling() {
        let seq = hundred();
        seq.delete_slice(..);
        assert_eq!(seq.len(), 0);
        assert_eq!(seq.page_count(), 0);
        assert_eq!(seq.to_vec(), Vec::<i32>::new());
        seq.set_slice(5..15, 0..30).unwrap();
        assert_eq!(seq.len(), 30);
        assert_eq!(seq.page_count(), 3);
        seq.insert(0, 7);
        assert_eq!(seq.get(0), Ok(7));
    }

    #[test]
    fn paged_stepped_assignment() {
        let seq = hundred();
        seq.set_slice(SliceSpec::from(..).step_by(25), [-1, -2, -3, -4])
            .unwrap();
        assert_eq!(seq.get_slice(SliceSpec::from(..).step_by(25)), vec![-1, -2, -3, -4]);
        assert_eq!(
            seq.set_slice(SliceSpec::from(..).step_by(25), [0]),
            Err(Error::LengthMismatch { expected: 4, actual: 1 })
        );
        seq.delete_slice(SliceSpec::from(..).step_by(-2));
        assert_eq!(seq.len(), 50);
        assert_eq!(seq.get(1), Ok(2));
    }

    #[test]
    fn paged_slice_to_paged() {
        let seq = hundred();
        let part = seq.get_slice_paged(25..35);
        assert_eq!(part, (25..35).collect::<Vec<_>>());
        assert_eq!(part.page_size(), 10);
        part.remove(5).unwrap();
        assert_eq!(part.get(5), Ok(31));
        assert_eq!(part.get(4), Ok(29));
        part.check_invariants().unwrap();

        let stepped = seq.get_slice_paged(SliceSpec::from(0..15).step_by(4));
        assert_eq!(stepped, [0, 4, 8, 12]);
    }

    #[test]
    fn paged_page_size_is_immutable() {
        let seq = hundred();
        assert_eq!(seq.page_size(), 10);
        assert_eq!(
            seq.set_page_size(10),
            Err(Error::ImmutableParameter { name: "page_size" })
        );
        assert_eq!(
            seq.set_page_size(20),
            Err(Error::ImmutableParameter { name: "page_size" })
        );
        assert!(matches!(
            PagedSequence::<i32>::with_page_size(0),
            Err(Error::InvalidArgument { name: "page_size", .. })
        ));
        assert_eq!(PagedSequence::<i32>::new().page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn paged_compact() {
        let seq = hundred();
        for index in (0..100).step_by(7) {
            seq.insert(index, -1);
        }
        assert!(!seq.dirt().is_empty());
        let before = seq.to_vec();
        seq.compact();
        assert_eq!(seq, before);
        assert_eq!(seq.dirt().entries(), &[(11, -5)]);
    }

    #[test]
    fn paged_iteration_and_conversions() {
        let seq: PagedSequence<i32> = (0..2500).collect();
        assert_eq!(seq.page_count(), 3);
        assert_eq!(seq.iter().count(), 2500);
        let sum: i32 = (&seq).into_iter().sum();
        assert_eq!(sum, (0..2500).sum());

        let mut iter = seq.iter();
        assert_eq!(iter.next(), Some(0));
        seq.delete_slice(1..);
        assert_eq!(iter.next(), None);

        let mut other = seq.clone();
        Extend::extend(&mut other, [1, 2]);
        assert_eq!(other.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(seq.pop(), Some(0));
        assert_eq!(seq.pop(), None);
        assert_eq!(format!("{:?}", hundred().get_slice_paged(..3)), "[0, 1, 2]");
    }

    #[test]
    fn paged_shared_between_threads() {
        let seq = Arc::new(PagedSequence::with_page_size(16).unwrap());
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || {
                    for i in 0..200 {
                        seq.insert(i % 7, worker * 1000 + i);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(seq.len(), 800);
        seq.check_invariants().unwrap();
    }

    #[test]
    fn paged_update_reenters() {
        let seq = hundred();
        let read = seq.update(5, |x| {
            *x = seq.len() as i32;
            seq.get(6)
        });
        assert_eq!(read, Ok(Ok(6)));
        assert_eq!(seq.get(5), Ok(100));

        // the value lands at the index, wherever the element went
        seq.update(0, |x| {
            *x = -1;
            seq.insert(0, 7);
        })
        .unwrap();
        assert_eq!(seq.get_slice(..3), vec![-1, 0, 1]);
        assert_eq!(seq.update(200, |_| ()), Err(Error::OutOfRange { index: 200, len: 101 }));
    }

    #[test]
    fn paged_update_reenters_on_other_thread() {
        let seq = Arc::new(hundred());
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&seq);
        thread::spawn(move || {
            let result = inner.update(0, |v| *v += inner.len() as i32);
            tx.send(result).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Ok(())));
        assert_eq!(seq.get(0), Ok(100));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(isize, i32),
        Remove(isize),
        Push(i32),
        SetSlice(Option<isize>, Option<isize>, isize, Vec<i32>),
        DeleteSlice(Option<isize>, Option<isize>, isize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let bound = proptest::option::of(-40isize..40);
        let step = prop_oneof![Just(1isize), -3isize..=-1, 2isize..=3];
        prop_oneof![
            (-40isize..40, any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            (-40isize..40).prop_map(Op::Remove),
            any::<i32>().prop_map(Op::Push),
            (
                bound.clone(),
                bound.clone(),
                step.clone(),
                proptest::collection::vec(any::<i32>(), 0..20)
            )
                .prop_map(|(a, b, c, v)| Op::SetSlice(a, b, c, v)),
            (bound.clone(), bound, step).prop_map(|(a, b, c)| Op::DeleteSlice(a, b, c)),
        ]
    }

    proptest! {
        #[test]
        fn paged_matches_vec_reference(
            page_size in 1usize..6,
            initial in proptest::collection::vec(any::<i32>(), 0..30),
            ops in proptest::collection::vec(op_strategy(), 0..40),
        ) {
            let seq = PagedSequence::builder()
                .page_size(page_size)
                .extend(initial.clone())
                .build()
                .unwrap();
            let mut reference = initial;
            for op in ops {
                match op {
                    Op::Insert(i, v) => {
                        seq.insert(i, v);
                        MutableSequence::insert(&mut reference, i, v).unwrap();
                    }
                    Op::Remove(i) => {
                        let expected = MutableSequence::remove(&mut reference, i);
                        prop_assert_eq!(seq.remove(i), expected);
                    }
                    Op::Push(v) => {
                        seq.push(v);
                        reference.push(v);
                    }
                    Op::SetSlice(a, b, c, v) => {
                        let spec = SliceSpec::try_new(a, b, Some(c)).unwrap();
                        let expected = reference.set_slice(spec, v.clone());
                        prop_assert_eq!(seq.set_slice(spec, v), expected);
                    }
                    Op::DeleteSlice(a, b, c) => {
                        let spec = SliceSpec::try_new(a, b, Some(c)).unwrap();
                        reference.delete_slice(spec).unwrap();
                        seq.delete_slice(spec);
                    }
                }
                prop_assert!(seq.check_invariants().is_ok());
                prop_assert_eq!(seq.len(), reference.len());
                prop_assert_eq!(seq.to_vec(), reference.clone());
            }
        }

        #[test]
        fn paged_slice_reads_match_reference(
            len in 0usize..60,
            page_size in 1usize..8,
            a in proptest::option::of(-70isize..70),
            b in proptest::option::of(-70isize..70),
            c in prop_oneof![-5isize..=-1, 1isize..=5],
        ) {
            let reference: Vec<usize> = (0..len).collect();
            let seq = PagedSequence::builder().page_size(page_size).extend(0..len).build().unwrap();
            // disturb the layout so reads go through the dirt log
            if len > 2 {
                seq.insert(1, 1000);
                seq.remove(1).unwrap();
                seq.remove(len as isize / 2).unwrap();
                seq.insert(len as isize / 2, len / 2);
            }
            let spec = SliceSpec::try_new(a, b, Some(c)).unwrap();
            prop_assert_eq!(seq.get_slice(spec), reference.get_slice(spec).unwrap());
            prop_assert_eq!(
                seq.get_slice_paged(spec).to_vec(),
                reference.get_slice(spec).unwrap()
            );
        }
    }
}
