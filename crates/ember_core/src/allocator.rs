//! Allocator Strategy
//!
//! Every subsystem receives an `Arc<dyn Allocator>` at construction and routes
//! all of its reservations through it: pool slot arrays, per-skeleton joint
//! buffers, animation keyframe storage. The default [`SystemAllocator`] simply
//! approves everything; [`TrackingAllocator`] keeps byte counts and can enforce
//! a hard budget.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{EmberError, Result};

pub trait Allocator: Send + Sync + fmt::Debug {
    /// Reserves `bytes` for the storage identified by `label`.
    fn allocate(&self, bytes: usize, label: &'static str) -> Result<()>;

    /// Returns a reservation previously granted by [`allocate`](Self::allocate).
    fn deallocate(&self, bytes: usize, label: &'static str);
}

/// Approves every reservation; memory comes from the global allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    #[inline]
    fn allocate(&self, _bytes: usize, _label: &'static str) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn deallocate(&self, _bytes: usize, _label: &'static str) {}
}

/// The allocator used when none is injected.
#[must_use]
pub fn default_allocator() -> Arc<dyn Allocator> {
    Arc::new(SystemAllocator)
}

/// Byte-counting allocator with an optional budget.
#[derive(Debug, Default)]
pub struct TrackingAllocator {
    current: AtomicUsize,
    peak: AtomicUsize,
    live_allocations: AtomicUsize,
    budget: Option<usize>,
}

impl TrackingAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses any reservation that would push the total above `bytes`.
    #[must_use]
    pub fn with_budget(bytes: usize) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    #[inline]
    pub fn current_bytes(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn peak_bytes(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn live_allocations(&self) -> usize {
        self.live_allocations.load(Ordering::Relaxed)
    }
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, bytes: usize, label: &'static str) -> Result<()> {
        let previous = self.current.fetch_add(bytes, Ordering::Relaxed);
        let total = previous.saturating_add(bytes);

        if self.budget.is_some_and(|budget| total > budget) {
            self.current.fetch_sub(bytes, Ordering::Relaxed);
            log::warn!("Allocator budget exceeded: '{label}' requested {bytes} bytes ({previous} in use)");
            return Err(EmberError::AllocationRefused { label, bytes });
        }

        self.peak.fetch_max(total, Ordering::Relaxed);
        self.live_allocations.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn deallocate(&self, bytes: usize, label: &'static str) {
        let previous = self.current.fetch_sub(bytes, Ordering::Relaxed);
        debug_assert!(previous >= bytes, "'{label}' returned more than it reserved");
        self.live_allocations.fetch_sub(1, Ordering::Relaxed);
    }
}
