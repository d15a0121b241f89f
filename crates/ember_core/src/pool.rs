//! Handle-Addressed Object Pool
//!
//! [`Pool`] pairs a [`SlotMap`] with a dense payload array of the same
//! capacity. It is the storage unit for every engine object: transforms,
//! skeletons, animations. Callers keep typed keys, never references across
//! frames; the borrow checker enforces that a `&T` obtained from the pool dies
//! before the next structural mutation.
//!
//! Capacity is fixed at construction and reserved through the injected
//! [`Allocator`] up front, so inserting never reallocates.

use std::marker::PhantomData;
use std::mem;
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::errors::Result;
use crate::handle::{Handle, Key};
use crate::slotmap::SlotMap;

pub struct Pool<K: Key, T> {
    slots: SlotMap,
    data: Vec<T>,
    label: &'static str,
    reserved_bytes: usize,
    allocator: Arc<dyn Allocator>,
    _key: PhantomData<fn() -> K>,
}

impl<K: Key, T: Default> Pool<K, T> {
    pub fn new(capacity: u32, label: &'static str, allocator: Arc<dyn Allocator>) -> Result<Self> {
        let slots = SlotMap::new(capacity)?;

        let reserved_bytes = capacity as usize * (mem::size_of::<u64>() + mem::size_of::<T>());
        allocator.allocate(reserved_bytes, label)?;

        let mut data = Vec::with_capacity(capacity as usize);
        data.resize_with(capacity as usize, T::default);

        log::debug!("Pool '{label}' created: {capacity} slots, {reserved_bytes} bytes");

        Ok(Self {
            slots,
            data,
            label,
            reserved_bytes,
            allocator,
            _key: PhantomData,
        })
    }

    /// Claims a slot and resets its payload to `T::default()`.
    ///
    /// Returns `None` when the pool is full.
    pub fn insert(&mut self) -> Option<(K, &mut T)> {
        let handle = self.slots.insert();
        if handle.is_null() {
            log::warn!(
                "Pool '{}' exhausted (capacity: {})",
                self.label,
                self.slots.capacity()
            );
            return None;
        }

        let slot = &mut self.data[handle.index() as usize];
        *slot = T::default();
        Some((K::from(handle), slot))
    }

    /// Frees the slot and hands its payload back to the caller.
    ///
    /// Returns `None` for a stale key; nothing is modified in that case.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let handle: Handle = key.into();
        if !self.slots.remove(handle) {
            log::warn!("Pool '{}': ignoring removal of stale key {key:?}", self.label);
            return None;
        }
        Some(mem::take(&mut self.data[handle.index() as usize]))
    }
}

impl<K: Key, T> Pool<K, T> {
    #[inline]
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.slots.contains(key.into())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        let handle: Handle = key.into();
        if self.slots.contains(handle) {
            self.data.get(handle.index() as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let handle: Handle = key.into();
        if self.slots.contains(handle) {
            self.data.get_mut(handle.index() as usize)
        } else {
            None
        }
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().map(K::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots
            .iter()
            .map(|handle| (K::from(handle), &self.data[handle.index() as usize]))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> + '_ {
        let slots = &self.slots;
        self.data
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, value)| {
                let handle = slots.key_at(index as u32);
                (!handle.is_null()).then(|| (K::from(handle), value))
            })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<K: Key, T> Drop for Pool<K, T> {
    fn drop(&mut self) {
        self.allocator.deallocate(self.reserved_bytes, self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{TrackingAllocator, default_allocator};
    use crate::errors::EmberError;

    crate::define_handle! {
        struct ItemId;
    }

    #[derive(Debug, Default, PartialEq)]
    struct Item {
        value: i32,
    }

    fn pool(capacity: u32) -> Pool<ItemId, Item> {
        Pool::new(capacity, "items", default_allocator()).unwrap()
    }

    #[test]
    fn insert_yields_defaulted_payload() {
        let mut items = pool(2);
        let (id, item) = items.insert().unwrap();
        assert_eq!(*item, Item::default());
        item.value = 7;
        assert_eq!(items.get(id).map(|i| i.value), Some(7));
    }

    #[test]
    fn reused_slot_is_reset() {
        let mut items = pool(1);
        let (a, item) = items.insert().unwrap();
        item.value = 42;
        assert_eq!(items.remove(a), Some(Item { value: 42 }));

        let (b, item) = items.insert().unwrap();
        assert_eq!(item.value, 0);
        assert!(items.get(a).is_none());
        assert!(items.get(b).is_some());
    }

    #[test]
    fn stale_key_lookups_fail() {
        let mut items = pool(2);
        let (a, _) = items.insert().unwrap();
        items.remove(a);
        assert!(items.get_mut(a).is_none());
        assert!(items.remove(a).is_none());
        assert!(items.get(ItemId::NULL).is_none());
    }

    #[test]
    fn full_pool_returns_none() {
        let mut items = pool(1);
        assert!(items.insert().is_some());
        assert!(items.insert().is_none());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn iter_mut_visits_live_slots_only() {
        let mut items = pool(4);
        let ids: Vec<_> = (0..3).map(|_| items.insert().unwrap().0).collect();
        items.remove(ids[1]);

        for (_, item) in items.iter_mut() {
            item.value += 1;
        }

        let seen: Vec<_> = items.iter().map(|(id, item)| (id, item.value)).collect();
        assert_eq!(seen, vec![(ids[0], 1), (ids[2], 1)]);
    }

    #[test]
    fn reservation_is_returned_on_drop() {
        let alloc = Arc::new(TrackingAllocator::new());
        {
            let _items: Pool<ItemId, Item> = Pool::new(8, "items", alloc.clone()).unwrap();
            assert_eq!(alloc.current_bytes(), 8 * (8 + mem::size_of::<Item>()));
        }
        assert_eq!(alloc.current_bytes(), 0);
    }

    #[test]
    fn refused_reservation_fails_construction() {
        let alloc = Arc::new(TrackingAllocator::with_budget(16));
        let result: Result<Pool<ItemId, Item>> = Pool::new(64, "items", alloc);
        assert!(matches!(result, Err(EmberError::AllocationRefused { .. })));
    }
}
