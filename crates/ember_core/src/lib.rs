//! Ember Core
//!
//! Foundations shared by every Ember subsystem:
//!
//! - [`Handle`] / [`define_handle!`]: packed 24/24-bit generational references
//! - [`SlotMap`]: fixed-capacity generational index allocator
//! - [`Pool`]: slot map + dense payload storage, the home of every engine object
//! - [`Allocator`]: injectable allocation strategy
//! - [`EngineSettings`]: pool capacities
//! - [`EmberError`] / [`Result`]

pub mod allocator;
pub mod errors;
pub mod handle;
pub mod math;
pub mod pool;
pub mod settings;
pub mod slotmap;

pub use allocator::{Allocator, SystemAllocator, TrackingAllocator, default_allocator};
pub use errors::{EmberError, Result};
pub use handle::{Handle, Key, MAX_INDEX};
pub use math::{decompose_trs, trs_matrix};
pub use pool::Pool;
pub use settings::EngineSettings;
pub use slotmap::SlotMap;
