//! Free-list arena owning every namespace node.
//!
//! Nodes refer to each other (children, parent) by [`SlabIndex`] rather than
//! by pointer, so the parent back-reference is a plain handle and ownership
//! stays with the arena. Freed slots are threaded onto a freelist and reused
//! by later inserts.

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

/// A compact 32-bit handle into a [`Slab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SlabIndex(u32);

impl SlabIndex {
    /// Creates a handle from a slot number.
    ///
    /// # Panics
    /// Panics if `index` does not fit in 32 bits.
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(
            index < u32::MAX as usize,
            "slab index must be less than u32::MAX"
        );
        Self(index as u32)
    }

    /// Returns the slot number.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Slot state.
#[derive(Debug, Clone)]
enum Entry<T> {
    /// Free; holds the next free slot of the freelist.
    Vacant(usize),
    Occupied(T),
}

pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    /// Occupied slot count.
    len: usize,
    /// Head of the freelist; equals `entries.len()` when the list is empty.
    next: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            next: 0,
        }
    }

    /// Inserts a value, returning its stable index.
    pub fn insert(&mut self, value: T) -> SlabIndex {
        let key = self.next;
        if key == self.entries.len() {
            self.entries.push(Entry::Occupied(value));
            self.next = self.entries.len();
        } else {
            let next_free = match mem::replace(&mut self.entries[key], Entry::Occupied(value)) {
                Entry::Vacant(next) => next,
                Entry::Occupied(_) => unreachable!("freelist head points at an occupied slot"),
            };
            self.next = next_free;
        }
        self.len += 1;
        SlabIndex::new(key)
    }

    pub fn get(&self, index: SlabIndex) -> Option<&T> {
        match self.entries.get(index.get())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, index: SlabIndex) -> Option<&mut T> {
        match self.entries.get_mut(index.get())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    /// Removes the value at `index` if it exists, returning it.
    pub fn try_remove(&mut self, index: SlabIndex) -> Option<T> {
        let key = index.get();
        let entry = self.entries.get_mut(key)?;
        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }
        match mem::replace(entry, Entry::Vacant(self.next)) {
            Entry::Occupied(value) => {
                self.next = key;
                self.len -= 1;
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

}

impl<T> Index<SlabIndex> for Slab<T> {
    type Output = T;

    fn index(&self, index: SlabIndex) -> &Self::Output {
        self.get(index).expect("invalid slab index")
    }
}

impl<T> IndexMut<SlabIndex> for Slab<T> {
    fn index_mut(&mut self, index: SlabIndex) -> &mut Self::Output {
        self.get_mut(index).expect("invalid slab index")
    }
}

impl<T> fmt::Debug for Slab<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slab")
            .field("len", &self.len)
            .field("next", &self.next)
            .field("slots", &self.entries.len())
            .finish()
    }
}
