//! Arena storage for the linked ring.
//!
//! Nodes live in a slot vector and refer to each other by slot index, so the
//! ring has no reference cycles. Vacant slots are chained into a free list
//! and reused. Every slot carries a generation that is bumped when its node
//! is released, which lets [`Handle`]s detect that their node is gone.
//!
//! The ring keeps an *anchor*: the slot of the node at logical index 0.
//! Logical order is ring order starting at the anchor.

use crate::error::{Error, Result};
use std::mem;

/// A copyable reference to one node of a [`LinkedSequence`].
///
/// A handle stays valid until its node is removed. Handles from one
/// sequence are meaningless for another.
///
/// [`LinkedSequence`]: crate::LinkedSequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    slot: usize,
    generation: u32,
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: usize,
    pub(crate) prev: usize,
}

enum Entry<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

struct Slot<T> {
    generation: u32,
    entry: Entry<T>,
}

pub(crate) struct Ring<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    anchor: Option<usize>,
    len: usize,
}

// slot management
impl<T> Ring<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            anchor: None,
            len: 0,
        }
    }

    pub(crate) fn node(&self, id: usize) -> &Node<T> {
        match &self.slots[id].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant { .. } => unreachable!("ring link points to vacant slot {}", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: usize) -> &mut Node<T> {
        match &mut self.slots[id].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant { .. } => unreachable!("ring link points to vacant slot {}", id),
        }
    }

    /// Store `value` in a fresh, unlinked node. The node links to itself.
    fn alloc(&mut self, value: T) -> usize {
        match self.free {
            Some(id) => {
                let slot = &mut self.slots[id];
                self.free = match slot.entry {
                    Entry::Vacant { next_free } => next_free,
                    Entry::Occupied(_) => unreachable!("free list points to occupied slot {}", id),
                };
                slot.entry = Entry::Occupied(Node {
                    value,
                    next: id,
                    prev: id,
                });
                id
            }
            None => {
                let id = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    entry: Entry::Occupied(Node {
                        value,
                        next: id,
                        prev: id,
                    }),
                });
                id
            }
        }
    }

    /// Vacate an already unlinked slot and return its value.
    fn release(&mut self, id: usize) -> T {
        let slot = &mut self.slots[id];
        slot.generation = slot.generation.wrapping_add(1);
        let entry = mem::replace(
            &mut slot.entry,
            Entry::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(id);
        match entry {
            Entry::Occupied(node) => node.value,
            Entry::Vacant { .. } => unreachable!("released vacant slot {}", id),
        }
    }

    pub(crate) fn handle(&self, id: usize) -> Handle {
        Handle {
            slot: id,
            generation: self.slots[id].generation,
        }
    }

    /// The slot of a handle, if its node is still alive.
    pub(crate) fn resolve(&self, handle: Handle) -> Option<usize> {
        let slot = self.slots.get(handle.slot)?;
        match slot.entry {
            Entry::Occupied(_) if slot.generation == handle.generation => Some(handle.slot),
            _ => None,
        }
    }
}

// link surgery
impl<T> Ring<T> {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub(crate) fn set_anchor(&mut self, id: usize) {
        self.anchor = Some(id);
    }

    pub(crate) fn next_of(&self, id: usize) -> usize {
        self.node(id).next
    }

    pub(crate) fn prev_of(&self, id: usize) -> usize {
        self.node(id).prev
    }

    fn connect(&mut self, prev: usize, next: usize) {
        self.node_mut(prev).next = next;
        self.node_mut(next).prev = prev;
    }

    /// Link the unlinked node `id` right before `next`.
    fn attach_before(&mut self, next: usize, id: usize) {
        let prev = self.prev_of(next);
        self.connect(prev, id);
        self.connect(id, next);
        self.len += 1;
    }

    /// Allocate `value` and link it right before `next`.
    pub(crate) fn insert_before(&mut self, next: usize, value: T) -> usize {
        let id = self.alloc(value);
        self.attach_before(next, id);
        id
    }

    /// Unlink and release `id`. A removed anchor hands over to its successor.
    pub(crate) fn detach(&mut self, id: usize) -> T {
        let (prev, next) = {
            let node = self.node(id);
            (node.prev, node.next)
        };
        if self.len == 1 {
            self.anchor = None;
        } else {
            self.connect(prev, next);
            if self.anchor == Some(id) {
                self.anchor = Some(next);
            }
        }
        self.len -= 1;
        self.release(id)
    }

    /// Append `value` at the logical end, i.e. right before the anchor.
    pub(crate) fn push_back(&mut self, value: T) -> usize {
        match self.anchor {
            Some(anchor) => self.insert_before(anchor, value),
            None => {
                let id = self.alloc(value);
                self.len = 1;
                self.anchor = Some(id);
                id
            }
        }
    }

    /// The slot at logical `index`, walking from the anchor in whichever
    /// direction is shorter.
    ///
    /// `index` must be smaller than `len`.
    pub(crate) fn seek(&self, index: usize) -> usize {
        debug_assert!(index < self.len, "seek past the end of the ring");
        let mut current = self.anchor.expect("seek in an empty ring");
        if index <= self.len - index {
            for _ in 0..index {
                current = self.next_of(current);
            }
        } else {
            for _ in index..self.len {
                current = self.prev_of(current);
            }
        }
        current
    }

    /// Move `steps` nodes forward (positive) or backward (negative).
    pub(crate) fn walk(&self, mut id: usize, steps: isize) -> usize {
        if steps >= 0 {
            for _ in 0..steps {
                id = self.next_of(id);
            }
        } else {
            for _ in steps..0 {
                id = self.prev_of(id);
            }
        }
        id
    }

    /// Insert `value` at logical index `at` (`at <= len`).
    ///
    /// Inserting at 0 keeps the anchor node: it takes the new value and the
    /// old head value moves into a new node right after it.
    pub(crate) fn insert(&mut self, at: usize, value: T) {
        debug_assert!(at <= self.len);
        match self.anchor {
            None => {
                self.push_back(value);
            }
            Some(anchor) if at == 0 => {
                let old = mem::replace(&mut self.node_mut(anchor).value, value);
                let next = self.next_of(anchor);
                self.insert_before(next, old);
            }
            Some(_) if at == self.len => {
                self.push_back(value);
            }
            Some(_) => {
                let next = self.seek(at);
                self.insert_before(next, value);
            }
        }
    }

    /// Exchange the values of two live nodes; the links stay untouched.
    pub(crate) fn swap_values(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.slots.split_at_mut(high);
        match (&mut head[low].entry, &mut tail[0].entry) {
            (Entry::Occupied(x), Entry::Occupied(y)) => mem::swap(&mut x.value, &mut y.value),
            _ => unreachable!("swapping values of vacant slots {} and {}", a, b),
        }
    }

    /// Slots in logical order.
    pub(crate) fn ids(&self) -> RingIds<'_, T> {
        RingIds {
            ring: self,
            current: self.anchor,
            remaining: self.len,
        }
    }

    /// Move every value out in logical order, leaving the ring empty.
    pub(crate) fn drain_values(&mut self) -> Vec<T> {
        let order: Vec<usize> = self.ids().collect();
        let mut values = Vec::with_capacity(order.len());
        for id in order {
            values.push(self.release(id));
        }
        self.anchor = None;
        self.len = 0;
        values
    }

    /// Verify ring circularity, the length counter and the anchor.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        let anchor = match self.anchor {
            None if self.len == 0 => return Ok(()),
            None => {
                return Err(Error::InvariantViolation(format!(
                    "ring of length {} has no anchor",
                    self.len
                )))
            }
            Some(anchor) => anchor,
        };
        if self.resolve(self.handle(anchor)).is_none() {
            return Err(Error::InvariantViolation("anchor is not alive".into()));
        }
        let mut current = anchor;
        let mut count = 0;
        loop {
            let next = self.next_of(current);
            if self.prev_of(next) != current {
                return Err(Error::InvariantViolation(format!(
                    "nodes {} and {} are not adjacent",
                    current, next
                )));
            }
            count += 1;
            current = next;
            if current == anchor || count > self.len {
                break;
            }
        }
        if count != self.len {
            return Err(Error::InvariantViolation(format!(
                "ring holds {} nodes but length is {}",
                count, self.len
            )));
        }
        Ok(())
    }
}

impl<T> FromIterator<T> for Ring<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ring = Ring::new();
        for value in iter {
            ring.push_back(value);
        }
        ring
    }
}

impl<T: Clone> Clone for Ring<T> {
    fn clone(&self) -> Self {
        self.ids().map(|id| self.node(id).value.clone()).collect()
    }
}

/// Slot iterator in logical order, bounded by the length.
pub(crate) struct RingIds<'a, T> {
    ring: &'a Ring<T>,
    current: Option<usize>,
    remaining: usize,
}

impl<T> Iterator for RingIds<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.current?;
        self.remaining -= 1;
        self.current = Some(self.ring.next_of(id));
        Some(id)
    }
}
