use crate::list::ring::Ring;
use crate::list::LinkedSequence;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ptr;

impl<T: PartialEq + Clone> PartialEq for LinkedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        // Both locks are never held at once.
        let theirs = other.to_vec();
        self == theirs.as_slice()
    }
}

impl<T: Eq + Clone> Eq for LinkedSequence<T> {}

impl<T: PartialEq> PartialEq<[T]> for LinkedSequence<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.with_ring(|ring| {
            ring.len() == other.len()
                && ring
                    .ids()
                    .zip(other)
                    .all(|(id, value)| ring.node(id).value == *value)
        })
    }
}

impl<T: PartialEq> PartialEq<&[T]> for LinkedSequence<T> {
    fn eq(&self, other: &&[T]) -> bool {
        *self == **other
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for LinkedSequence<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == *other.as_slice()
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for LinkedSequence<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T: PartialOrd + Clone> PartialOrd for LinkedSequence<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if ptr::eq(self, other) {
            return Some(Ordering::Equal);
        }
        let theirs = other.to_vec();
        self.to_vec().partial_cmp(&theirs)
    }
}

impl<T: Ord + Clone> Ord for LinkedSequence<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if ptr::eq(self, other) {
            return Ordering::Equal;
        }
        let theirs = other.to_vec();
        self.to_vec().cmp(&theirs)
    }
}

impl<T: Clone> Clone for LinkedSequence<T> {
    fn clone(&self) -> Self {
        LinkedSequence::from_ring(self.with_ring(Ring::clone))
    }
}

impl<T: Hash> Hash for LinkedSequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.with_ring(|ring| {
            for id in ring.ids() {
                ring.node(id).value.hash(state);
            }
            ring.len().hash(state);
        })
    }
}

impl<T> LinkedSequence<T> {
    /// Returns `true` if the `LinkedSequence` contains an element equal to
    /// the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([0, 1, 2]);
    ///
    /// assert_eq!(seq.contains(&0), true);
    /// assert_eq!(seq.contains(&10), false);
    /// ```
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        self.position(x).is_some()
    }

    /// Returns the logical index of the first element equal to `x`.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([3, 1, 4, 1]);
    /// assert_eq!(seq.position(&1), Some(1));
    /// assert_eq!(seq.position(&5), None);
    /// ```
    pub fn position(&self, x: &T) -> Option<usize>
    where
        T: PartialEq<T>,
    {
        self.with_ring(|ring| ring.ids().position(|id| ring.node(id).value == *x))
    }

    /// Counts the elements equal to `x`.
    pub fn count(&self, x: &T) -> usize
    where
        T: PartialEq<T>,
    {
        self.with_ring(|ring| ring.ids().filter(|&id| ring.node(id).value == *x).count())
    }

    /// Removes the first element equal to `x` and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([3, 1, 4, 1]);
    /// assert_eq!(seq.remove_value(&1), Some(1));
    /// assert_eq!(seq, [3, 4, 1]);
    /// assert_eq!(seq.remove_value(&9), None);
    /// ```
    pub fn remove_value(&self, x: &T) -> Option<T>
    where
        T: PartialEq<T>,
    {
        self.with_ring_mut(|ring| {
            let id = ring.ids().find(|&id| ring.node(id).value == *x)?;
            Some(ring.detach(id))
        })
    }

    /// Reverses the order of the elements in place.
    ///
    /// Values are swapped between nodes walking inwards from both ends, so
    /// every node and the anchor stay where they are.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::LinkedSequence;
    ///
    /// let seq = LinkedSequence::from_iter([1, 2, 3, 4, 5]);
    /// seq.reverse();
    /// assert_eq!(seq, [5, 4, 3, 2, 1]);
    /// ```
    pub fn reverse(&self) {
        self.with_ring_mut(|ring| {
            let anchor = match ring.anchor() {
                Some(anchor) => anchor,
                None => return,
            };
            let (mut front, mut back) = (anchor, ring.prev_of(anchor));
            for _ in 0..ring.len() / 2 {
                ring.swap_values(front, back);
                front = ring.next_of(front);
                back = ring.prev_of(back);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::list::LinkedSequence;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn list_eq() {
        let a = LinkedSequence::from_iter([1, 2, 3]);
        let b = LinkedSequence::from_iter([1, 2, 3]);
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(a, [1, 2, 3][..]);
        assert_eq!(a, &[1, 2, 3][..]);
        assert_ne!(a, [1, 2]);
        assert_ne!(a, [1, 2, 4]);
        b.rotate(1);
        assert_ne!(a, b);
        assert_eq!(LinkedSequence::<i32>::new(), []);
    }

    #[test]
    fn list_ord() {
        let a = LinkedSequence::from_iter([1, 2, 3]);
        let b = LinkedSequence::from_iter([1, 3]);
        assert!(a < b);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
        assert!(LinkedSequence::<i32>::new() < a);
    }

    #[test]
    fn list_clone_is_deep() {
        let a = LinkedSequence::from_iter(0..5);
        let b = a.clone();
        b.set(0, 100).unwrap();
        b.push(5);
        assert_eq!(a, [0, 1, 2, 3, 4]);
        assert_eq!(b, [100, 1, 2, 3, 4, 5]);
        b.check_invariants().unwrap();
    }

    #[test]
    fn list_hash_follows_order() {
        let a = LinkedSequence::from_iter([1, 2, 3]);
        let b = LinkedSequence::from_iter([3, 1, 2]);
        assert_ne!(hash_of(&a), hash_of(&b));
        b.rotate(-1);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn list_search() {
        let seq = LinkedSequence::from_iter([5, 1, 5, 2, 5]);
        assert!(seq.contains(&2));
        assert!(!seq.contains(&3));
        assert_eq!(seq.position(&5), Some(0));
        assert_eq!(seq.position(&2), Some(3));
        assert_eq!(seq.count(&5), 3);
        assert_eq!(seq.count(&7), 0);
        assert_eq!(seq.remove_value(&5), Some(5));
        assert_eq!(seq, [1, 5, 2, 5]);
        assert_eq!(seq.position(&5), Some(1));
    }

    #[test]
    fn list_reverse() {
        for n in 0..7 {
            let seq = LinkedSequence::from_iter(0..n);
            let head = seq.anchor();
            seq.reverse();
            assert_eq!(seq.to_vec(), (0..n).rev().collect::<Vec<_>>());
            assert_eq!(seq.anchor(), head);
            seq.check_invariants().unwrap();
        }
    }
}
