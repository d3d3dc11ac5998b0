use std::cell::RefCell;
use std::fmt::{Debug, Formatter};

use parking_lot::ReentrantMutex;
use tracing::trace;

use crate::error::{clamp_insert_index, normalize_index, Error, Result};
use crate::list::iterator::Iter;
use crate::list::ring::Ring;

pub use crate::list::ring::Handle;

pub mod iterator;

mod algorithms;
mod ring;
mod slicing;

/// The `LinkedSequence` is a doubly-linked ring with the full mutable
/// sequence contract: scalar and slice reads, writes, deletions,
/// insertion anywhere, and in-place rotation.
///
/// Inserting or removing a node is constant-time link surgery once the
/// position is reached. Reaching a position walks from the anchor (the
/// node at logical index 0) in whichever direction is shorter, so it takes
/// *O*(min(*i*, *n* - *i*)) time.
///
/// Every operation takes `&self` and holds the sequence's lock for its
/// whole duration, so a `LinkedSequence` can be shared between threads. The
/// lock is reentrant: a closure passed to [`LinkedSequence::update`] may
/// call back into the same sequence.
///
/// # Examples
///
/// ```
/// use altseq::{LinkedSequence, SliceSpec};
///
/// let seq = LinkedSequence::from_iter([1, 2, 3, 4]);
/// seq.rotate(1);
/// assert_eq!(seq, [4, 1, 2, 3]);
///
/// seq.set_slice(SliceSpec::from(1..3), [7, 8, 9]).unwrap();
/// assert_eq!(seq, [4, 7, 8, 9, 3]);
///
/// let odd = seq.get_slice(SliceSpec::from(..).step_by(2));
/// assert_eq!(odd, [4, 8, 3]);
/// ```
pub struct LinkedSequence<T> {
    ring: ReentrantMutex<RefCell<Ring<T>>>,
}

// private methods
impl<T> LinkedSequence<T> {
    pub(crate) fn from_ring(ring: Ring<T>) -> Self {
        Self {
            ring: ReentrantMutex::new(RefCell::new(ring)),
        }
    }

    // `f` must not call back into this sequence.
    pub(crate) fn with_ring<R>(&self, f: impl FnOnce(&Ring<T>) -> R) -> R {
        let guard = self.ring.lock();
        let ring = guard.borrow();
        f(&ring)
    }

    pub(crate) fn with_ring_mut<R>(&self, f: impl FnOnce(&mut Ring<T>) -> R) -> R {
        let guard = self.ring.lock();
        let mut ring = guard.borrow_mut();
        let result = f(&mut ring);
        #[cfg(any(debug_assertions, feature = "checked"))]
        if let Err(err) = ring.check_invariants() {
            panic!("{}", err);
        }
        result
    }
}

impl<T> LinkedSequence<T> {
    /// Create an empty `LinkedSequence`.
    ///
    /// # Examples
    /// ```
    /// use altseq::LinkedSequence;
    /// let seq: LinkedSequence<u32> = LinkedSequence::new();
    /// assert!(seq.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::from_ring(Ring::new())
    }

    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn len(&self) -> usize {
        self.with_ring(Ring::len)
    }

    /// Returns `true` if the sequence holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all elements.
    pub fn clear(&self) {
        self.with_ring_mut(|ring| {
            ring.drain_values();
        });
    }

    /// Returns a clone of the element at `index`. Negative indices count
    /// from the end.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(*i*, *n* - *i*)) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{Error, LinkedSequence};
    ///
    /// let seq = LinkedSequence::from_iter([0, 1, 2]);
    /// assert_eq!(seq.get(-1), Ok(2));
    /// assert_eq!(seq.get(3), Err(Error::OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn get(&self, index: isize) -> Result<T>
    where
        T: Clone,
    {
        self.with_ring(|ring| {
            let at = normalize_index(index, ring.len())?;
            Ok(ring.node(ring.seek(at)).value.clone())
        })
    }

    /// Replaces the element at `index` and returns the previous value.
    pub fn set(&self, index: isize, value: T) -> Result<T> {
        self.with_ring_mut(|ring| {
            let at = normalize_index(index, ring.len())?;
            let id = ring.seek(at);
            Ok(std::mem::replace(&mut ring.node_mut(id).value, value))
        })
    }

    /// Applies `f` to the element at `index` and stores the result back.
    ///
    /// `f` works on a copy of the element, so it may read or even modify the
    /// sequence itself. The lock stays held until the value is stored back,
    /// so other threads see the update as a single step. If `f` removes the
    /// element, nothing is stored and [`Error::StaleHandle`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3]);
    /// seq.update(0, |x| *x += seq.len() as i32).unwrap();
    /// assert_eq!(seq, [4, 2, 3]);
    /// ```
    pub fn update<R>(&self, index: isize, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Clone,
    {
        let _guard = self.ring.lock();
        let (handle, mut value) = self.with_ring(|ring| {
            let at = normalize_index(index, ring.len())?;
            let id = ring.seek(at);
            Ok::<_, Error>((ring.handle(id), ring.node(id).value.clone()))
        })?;
        let result = f(&mut value);
        self.with_ring_mut(|ring| {
            let id = ring.resolve(handle).ok_or(Error::StaleHandle)?;
            ring.node_mut(id).value = value;
            Ok(result)
        })
    }

    /// Removes the element at `index` and returns it.
    ///
    /// Removing the anchor makes its successor the new anchor.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3]);
    /// assert_eq!(seq.remove(0), Ok(1));
    /// assert_eq!(seq, [2, 3]);
    /// ```
    pub fn remove(&self, index: isize) -> Result<T> {
        self.with_ring_mut(|ring| {
            let at = normalize_index(index, ring.len())?;
            let id = ring.seek(at);
            Ok(ring.detach(id))
        })
    }

    /// Inserts `value` before the element currently at `index`.
    ///
    /// `index` is clamped to `0..=len`, so any index past the end appends.
    /// Inserting at the front keeps the anchor node, which takes the new
    /// value: a handle obtained from [`LinkedSequence::anchor`] keeps
    /// pointing at the head.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 4]);
    /// seq.insert(-1, 3);
    /// assert_eq!(seq, [1, 2, 3, 4]);
    ///
    /// let head = seq.anchor().unwrap();
    /// seq.insert(0, 0);
    /// assert_eq!(seq.value_of(head), Ok(0));
    /// ```
    pub fn insert(&self, index: isize, value: T) {
        self.with_ring_mut(|ring| {
            let at = clamp_insert_index(index, ring.len());
            ring.insert(at, value);
        })
    }

    /// Appends an element to the back.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    pub fn push(&self, value: T) {
        self.with_ring_mut(|ring| {
            ring.push_back(value);
        })
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop(&self) -> Option<T> {
        self.with_ring_mut(|ring| {
            let anchor = ring.anchor()?;
            let last = ring.prev_of(anchor);
            Some(ring.detach(last))
        })
    }

    /// Removes the first element and returns it, or `None` if empty.
    pub fn pop_front(&self) -> Option<T> {
        self.with_ring_mut(|ring| {
            let anchor = ring.anchor()?;
            Some(ring.detach(anchor))
        })
    }

    /// Appends every element of `iter` to the back.
    pub fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        self.with_ring_mut(|ring| {
            for value in iter {
                ring.push_back(value);
            }
        })
    }

    /// Rotates the sequence `n` steps to the right; negative `n` rotates
    /// to the left.
    ///
    /// Only the anchor moves: no node is reallocated or relinked.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(min(*k*, *n* - *k*)) time,
    /// where *k* = `n` mod `len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter(1..=10);
    /// seq.rotate(-5);
    /// assert_eq!(seq, [6, 7, 8, 9, 10, 1, 2, 3, 4, 5]);
    /// seq.rotate(5);
    /// assert_eq!(seq, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    /// ```
    pub fn rotate(&self, n: isize) {
        self.with_ring_mut(|ring| {
            let len = ring.len();
            if len < 2 {
                return;
            }
            let shift = n.rem_euclid(len as isize) as usize;
            if shift == 0 {
                return;
            }
            let anchor = ring.seek(len - shift);
            trace!(n, len, "rotating ring anchor");
            ring.set_anchor(anchor);
        })
    }

    /// A handle to the node currently at `index`.
    pub fn handle(&self, index: isize) -> Result<Handle> {
        self.with_ring(|ring| {
            let at = normalize_index(index, ring.len())?;
            Ok(ring.handle(ring.seek(at)))
        })
    }

    /// A handle to the anchor, the node at logical index 0.
    pub fn anchor(&self) -> Option<Handle> {
        self.with_ring(|ring| ring.anchor().map(|id| ring.handle(id)))
    }

    /// Returns a clone of the value held by the node behind `handle`.
    pub fn value_of(&self, handle: Handle) -> Result<T>
    where
        T: Clone,
    {
        self.with_ring(|ring| {
            let id = ring.resolve(handle).ok_or(Error::StaleHandle)?;
            Ok(ring.node(id).value.clone())
        })
    }

    /// Makes the node behind `handle` the anchor, so it becomes index 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3, 4]);
    /// let third = seq.handle(2).unwrap();
    /// seq.set_anchor(third).unwrap();
    /// assert_eq!(seq, [3, 4, 1, 2]);
    /// ```
    pub fn set_anchor(&self, handle: Handle) -> Result<()> {
        self.with_ring_mut(|ring| {
            let id = ring.resolve(handle).ok_or(Error::StaleHandle)?;
            ring.set_anchor(id);
            Ok(())
        })
    }

    /// Provides a forward iterator yielding clones of the elements.
    ///
    /// The iterator locks the sequence for one step at a time. It yields at
    /// most as many elements as the sequence held when it was created; if
    /// the node it is about to visit was removed meanwhile, it stops.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3]);
    /// let doubled: Vec<i32> = seq.iter().map(|x| x * 2).collect();
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone,
    {
        Iter::new(self)
    }

    /// Copies the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.with_ring(|ring| ring.ids().map(|id| ring.node(id).value.clone()).collect())
    }

    /// Consumes the sequence and returns its elements in order.
    pub fn into_vec(self) -> Vec<T> {
        self.ring.into_inner().into_inner().drain_values()
    }

    /// Verify the ring structure. Always `Ok` unless there is a bug.
    pub fn check_invariants(&self) -> Result<()> {
        self.with_ring(Ring::check_invariants)
    }
}

impl<T: Debug> Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.with_ring(|ring| {
            f.debug_list()
                .entries(ring.ids().map(|id| &ring.node(id).value))
                .finish()
        })
    }
}

impl<T> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}
