use crate::list::ring::Handle;
use crate::list::LinkedSequence;
use std::fmt;
use std::iter::FusedIterator;

/// An iterator over clones of the elements of a `LinkedSequence`.
///
/// The iterator keeps a [`Handle`] to the next node and locks the sequence
/// only while it reads that node and steps past it. It never yields more
/// elements than the sequence held when the iterator was created.
///
/// Mutating the sequence while iterating is memory-safe, but the elements
/// yielded afterwards are unspecified: if the next node was removed the
/// iteration simply ends.
///
/// # Examples
///
/// ```
/// use altseq::LinkedSequence;
///
/// let seq = LinkedSequence::from_iter([1, 2, 3]);
/// let mut iter = seq.iter();
/// assert_eq!(iter.next(), Some(1));
/// assert_eq!(iter.next(), Some(2));
/// assert_eq!(iter.next(), Some(3));
/// assert_eq!(iter.next(), None);
/// assert_eq!(iter.next(), None); // Fused and non-cyclic
///
/// // every call produces a fresh iterator
/// assert_eq!(seq.iter().count(), 3);
/// ```
pub struct Iter<'a, T> {
    seq: &'a LinkedSequence<T>,
    next: Option<Handle>,
    remaining: usize,
}

impl<'a, T: Clone> Iter<'a, T> {
    pub(crate) fn new(seq: &'a LinkedSequence<T>) -> Self {
        let (next, remaining) = seq.with_ring(|ring| {
            let next = ring.anchor().map(|id| ring.handle(id));
            (next, ring.len())
        });
        Self {
            seq,
            next,
            remaining,
        }
    }
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.next.take()?;
        let step = self.seq.with_ring(|ring| {
            let id = ring.resolve(handle)?;
            let next = ring.next_of(id);
            Some((ring.node(id).value.clone(), ring.handle(next)))
        });
        match step {
            Some((value, next)) => {
                self.remaining -= 1;
                self.next = Some(next);
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

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("next", &self.next)
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// An owning iterator over the elements of a `LinkedSequence`.
///
/// This `struct` is created by the [`into_iter`] method on
/// [`LinkedSequence`] (provided by the `IntoIterator` trait).
///
/// [`into_iter`]: LinkedSequence::into_iter
#[derive(Debug)]
pub struct IntoIter<T> {
    values: std::vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.values.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.values.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for LinkedSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            values: self.into_vec().into_iter(),
        }
    }
}

impl<'a, T: Clone> IntoIterator for &'a LinkedSequence<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for LinkedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        LinkedSequence::from_ring(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        LinkedSequence::extend(self, iter)
    }
}

impl<'a, T: 'a + Copy> Extend<&'a T> for LinkedSequence<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        LinkedSequence::extend(self, iter.into_iter().copied())
    }
}
