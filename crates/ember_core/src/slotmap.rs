//! Fixed-Capacity Generational Slot Map
//!
//! The slot array doubles as the free list. A live slot stores its own handle
//! (index == position). A free slot stores [`FREE_FLAG`] together with the
//! generation the *next* occupant will receive and the index of the next free
//! slot; the list is terminated by `capacity`, which is out of range.
//!
//! Generations start at 1 and are bumped on removal, so a handle that has been
//! removed is never reported as contained again, even after its index is reused.

use crate::errors::{EmberError, Result};
use crate::handle::{FREE_FLAG, Handle, MAX_INDEX};

#[derive(Debug, Clone)]
pub struct SlotMap {
    slots: Vec<u64>,
    free_head: u32,
    len: u32,
}

#[inline]
fn free_slot(next_free: u32, generation: u32) -> u64 {
    FREE_FLAG | Handle::pack(next_free, generation).to_bits()
}

impl SlotMap {
    /// Creates a slot map with every slot free.
    ///
    /// `capacity` must fit in the 24-bit index budget.
    pub fn new(capacity: u32) -> Result<Self> {
        if capacity > MAX_INDEX {
            return Err(EmberError::InvalidCapacity {
                capacity,
                max: MAX_INDEX,
            });
        }

        let slots = (0..capacity).map(|i| free_slot(i + 1, 1)).collect();

        Ok(Self {
            slots,
            free_head: 0,
            len: 0,
        })
    }

    /// Pops the free-list head.
    ///
    /// Returns [`Handle::NULL`] when every slot is occupied; the map never grows.
    pub fn insert(&mut self) -> Handle {
        let index = self.free_head;
        let Some(word) = self.slots.get_mut(index as usize) else {
            return Handle::NULL;
        };
        debug_assert!(*word & FREE_FLAG != 0, "free list points at a live slot");

        let free = Handle::from_bits(*word & !FREE_FLAG);
        self.free_head = free.index();

        let handle = Handle::pack(index, free.generation());
        *word = handle.to_bits();
        self.len += 1;
        handle
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        let bits = handle.to_bits();
        bits & FREE_FLAG == 0
            && !handle.is_null()
            && self
                .slots
                .get(handle.index() as usize)
                .is_some_and(|&word| word == bits)
    }

    /// Frees the slot behind `handle` and advances its generation.
    ///
    /// Returns `false` (and changes nothing) if `handle` is not currently live.
    pub fn remove(&mut self, handle: Handle) -> bool {
        if !self.contains(handle) {
            return false;
        }

        // Generation 0 is reserved for the null handle, so wrap back to 1
        let next_generation = match handle.generation() {
            MAX_INDEX => 1,
            generation => generation + 1,
        };

        self.slots[handle.index() as usize] = free_slot(self.free_head, next_generation);
        self.free_head = handle.index();
        self.len -= 1;
        true
    }

    /// Live handle stored at `index`, or [`Handle::NULL`] if the slot is free
    /// or out of range.
    #[must_use]
    pub fn key_at(&self, index: u32) -> Handle {
        match self.slots.get(index as usize) {
            Some(&word) if word & FREE_FLAG == 0 && Handle::from_bits(word).index() == index => {
                Handle::from_bits(word)
            }
            _ => Handle::NULL,
        }
    }

    /// First live slot index `>= min_index`, or `capacity` if there is none.
    #[must_use]
    pub fn next_alive(&self, min_index: u32) -> u32 {
        (min_index..self.capacity())
            .find(|&i| !self.key_at(i).is_null())
            .unwrap_or(self.capacity())
    }

    /// Iterates live handles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        (0..self.capacity())
            .map(|i| self.key_at(i))
            .filter(|h| !h.is_null())
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_head >= self.capacity()
    }
}
