//! A vector that produces missing tail elements on demand.
//!
//! [`DefaultList`] is to `Vec` what a default-producing map is to a plain
//! map: reading past the end yields a value made by a producer instead of
//! failing. [`DefaultList::get_or_default`] only produces the value, while
//! [`DefaultList::get_or_fill`] also stores it, appending produced values for
//! every missing index up to and including the requested one.
//!
//! ```
//! use altseq::{DefaultList, Producer};
//!
//! let mut squares: DefaultList<usize> = DefaultList::with_producer(Producer::indexed(|i| i * i));
//! assert_eq!(squares.get_or_default(4), Ok(16));
//! assert!(squares.is_empty());
//!
//! assert_eq!(squares.get_or_fill(3), Ok(&9));
//! assert_eq!(*squares, vec![0, 1, 4, 9]);
//! ```

use crate::error::{clamp_insert_index, normalize_index, Result};
use crate::sequence::{MutableSequence, Sequence, SliceableSequence};
use crate::slice::SliceSpec;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Produces the value for a missing index.
pub trait Produce<T> {
    fn produce(&self, index: usize) -> T;
}

/// The producer of a [`DefaultList`], chosen once at construction.
pub enum Producer<T> {
    /// Ignores the index.
    Constant(Box<dyn Fn() -> T + Send + Sync>),
    /// Receives the index of the value being produced.
    Indexed(Box<dyn Fn(usize) -> T + Send + Sync>),
}

impl<T> Producer<T> {
    pub fn constant(f: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Producer::Constant(Box::new(f))
    }

    pub fn indexed(f: impl Fn(usize) -> T + Send + Sync + 'static) -> Self {
        Producer::Indexed(Box::new(f))
    }
}

impl<T> Produce<T> for Producer<T> {
    #[inline]
    fn produce(&self, index: usize) -> T {
        match self {
            Producer::Constant(f) => f(),
            Producer::Indexed(f) => f(index),
        }
    }
}

impl<T> Produce<T> for fn(usize) -> T {
    #[inline]
    fn produce(&self, index: usize) -> T {
        self(index)
    }
}

impl<T: Default + 'static> Default for Producer<T> {
    fn default() -> Self {
        Producer::constant(T::default)
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Constant(_) => f.write_str("Producer::Constant"),
            Producer::Indexed(_) => f.write_str("Producer::Indexed"),
        }
    }
}

/// A `Vec<T>` with a producer for elements past its end.
///
/// `DefaultList` derefs to the wrapped `Vec`, so every ordinary vector
/// operation is available.
pub struct DefaultList<T, P = Producer<T>> {
    values: Vec<T>,
    producer: P,
}

impl<T: Default + 'static> DefaultList<T> {
    /// An empty list producing `T::default()`.
    pub fn new() -> Self {
        Self::with_producer(Producer::default())
    }
}

impl<T: Default + 'static> Default for DefaultList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: Produce<T>> DefaultList<T, P> {
    pub fn with_producer(producer: P) -> Self {
        Self::from_vec(Vec::new(), producer)
    }

    pub fn from_vec(values: Vec<T>, producer: P) -> Self {
        Self { values, producer }
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    /// Returns the element at `index`, appending produced values for every
    /// missing index up to and including `index` first.
    ///
    /// Negative indices count from the end and are never filled: one that
    /// reaches before the start is [`Error::OutOfRange`].
    ///
    /// # Examples
    ///
    /// ```
    /// use altseq::{DefaultList, Error, Producer};
    ///
    /// let mut list: DefaultList<char> = DefaultList::with_producer(Producer::constant(|| 'x'));
    /// list.push('a');
    /// assert_eq!(list.get_or_fill(2), Ok(&'x'));
    /// assert_eq!(*list, vec!['a', 'x', 'x']);
    /// assert_eq!(list.get_or_fill(-3), Ok(&'a'));
    /// assert_eq!(list.get_or_fill(-4), Err(Error::OutOfRange { index: -4, len: 3 }));
    /// ```
    pub fn get_or_fill(&mut self, index: isize) -> Result<&T> {
        let at = self.fill_index(index)?;
        Ok(&self.values[at])
    }

    /// Like [`DefaultList::get_or_fill`] but returns a mutable reference.
    pub fn get_or_fill_mut(&mut self, index: isize) -> Result<&mut T> {
        let at = self.fill_index(index)?;
        Ok(&mut self.values[at])
    }

    /// Returns a clone of the element at `index`, or a produced value when
    /// `index` is past the end. Nothing is stored.
    pub fn get_or_default(&self, index: isize) -> Result<T>
    where
        T: Clone,
    {
        if index >= 0 && index as usize >= self.values.len() {
            return Ok(self.producer.produce(index as usize));
        }
        let at = normalize_index(index, self.values.len())?;
        Ok(self.values[at].clone())
    }

    /// Appends produced values until the list holds `len` elements.
    pub fn fill_to(&mut self, len: usize) {
        for index in self.values.len()..len {
            let value = self.producer.produce(index);
            self.values.push(value);
        }
    }

    fn fill_index(&mut self, index: isize) -> Result<usize> {
        if index >= 0 {
            self.fill_to(index as usize + 1);
        }
        normalize_index(index, self.values.len())
    }
}

impl<T: Clone, P: Clone> Clone for DefaultList<T, P> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            producer: self.producer.clone(),
        }
    }
}

impl<T, P> Deref for DefaultList<T, P> {
    type Target = Vec<T>;

    #[inline]
    fn deref(&self) -> &Vec<T> {
        &self.values
    }
}

impl<T, P> DerefMut for DefaultList<T, P> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }
}

impl<T: fmt::Debug, P> fmt::Debug for DefaultList<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<T: Clone, P: Produce<T>> Sequence for DefaultList<T, P> {
    type Item = T;

    fn len(&self) -> usize {
        self.values.len()
    }

    /// Reads past the end produce a value without storing it.
    fn get(&self, index: isize) -> Result<T> {
        self.get_or_default(index)
    }
}

impl<T: Clone, P: Produce<T>> MutableSequence for DefaultList<T, P> {
    /// Setting past the end fills the gap with produced values first.
    fn set(&mut self, index: isize, value: T) -> Result<()> {
        *self.get_or_fill_mut(index)? = value;
        Ok(())
    }

    fn remove(&mut self, index: isize) -> Result<T> {
        let at = normalize_index(index, self.values.len())?;
        Ok(self.values.remove(at))
    }

    fn insert(&mut self, index: isize, value: T) -> Result<()> {
        let at = clamp_insert_index(index, self.values.len());
        self.values.insert(at, value);
        Ok(())
    }
}

impl<T: Clone, P: Produce<T>> SliceableSequence for DefaultList<T, P> {
    fn get_slice(&self, spec: SliceSpec) -> Result<Vec<T>> {
        self.values.get_slice(spec)
    }

    fn set_slice(&mut self, spec: SliceSpec, values: Vec<T>) -> Result<()> {
        self.values.set_slice(spec, values)
    }

    fn delete_slice(&mut self, spec: SliceSpec) -> Result<()> {
        self.values.delete_slice(spec)
    }
}

impl<T: PartialEq, P> PartialEq<Vec<T>> for DefaultList<T, P> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.values == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_producer_uses_type_default() {
        let mut list: DefaultList<String> = DefaultList::new();
        assert_eq!(list.get_or_default(10), Ok(String::new()));
        assert!(list.is_empty());
        list.get_or_fill_mut(1).unwrap().push_str("one");
        assert_eq!(list, vec![String::new(), "one".to_string()]);
    }

    #[test]
    fn constant_producer_is_called_once_per_filled_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut list = DefaultList::with_producer(Producer::constant(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            7
        }));
        assert_eq!(list.get_or_fill(4), Ok(&7));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // in range: nothing produced
        assert_eq!(list.get_or_fill(2), Ok(&7));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn indexed_producer_sees_each_index() {
        let mut list = DefaultList::from_vec(vec![100], Producer::indexed(|i| i * 10));
        assert_eq!(list.get_or_default(0), Ok(100));
        assert_eq!(list.get_or_default(3), Ok(30));
        list.fill_to(4);
        assert_eq!(list, vec![100, 10, 20, 30]);
        list.fill_to(2);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn negative_indices_never_fill() {
        let mut list = DefaultList::from_vec(vec![1, 2], Producer::constant(|| 0));
        assert_eq!(list.get_or_default(-1), Ok(2));
        assert_eq!(
            list.get_or_default(-3),
            Err(Error::OutOfRange { index: -3, len: 2 })
        );
        assert!(list.get_or_fill(-3).is_err());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn sequence_contract() {
        let mut list = DefaultList::from_vec(vec![0, 1, 2], Producer::indexed(|i| i as i32));
        assert_eq!(Sequence::get(&list, 5), Ok(5));
        MutableSequence::set(&mut list, 5, 50).unwrap();
        assert_eq!(list, vec![0, 1, 2, 3, 4, 50]);
        MutableSequence::insert(&mut list, -1, 40).unwrap();
        assert_eq!(MutableSequence::remove(&mut list, 0), Ok(0));
        list.delete_slice(SliceSpec::from(..).step_by(2)).unwrap();
        assert_eq!(list, vec![2, 4, 50]);
    }

    #[test]
    fn fn_pointer_producer() {
        fn twice(i: usize) -> usize {
            2 * i
        }
        let mut list = DefaultList::with_producer(twice as fn(usize) -> usize);
        assert_eq!(list.get_or_fill(2), Ok(&4));
        assert_eq!(list, vec![0, 2, 4]);
    }
}
