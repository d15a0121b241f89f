//! Error Types
//!
//! [`EmberError`] covers every recoverable failure of the engine core:
//! - stale or foreign handles passed to a subsystem
//! - pool exhaustion and allocator refusals
//! - malformed skeleton / animation input at creation time
//! - configuration parse errors
//!
//! Data-quality issues met during playback (a channel aimed at a joint the
//! skeleton does not have, duplicate key times, zero blend weights) are not
//! errors; sampling and blending handle them in place.

use thiserror::Error;

use crate::handle::Handle;

#[derive(Error, Debug)]
pub enum EmberError {
    // ========================================================================
    // Handle & Pool Errors
    // ========================================================================
    /// The handle is null, stale, or belongs to another pool.
    #[error("Invalid {kind} handle: {handle:?}")]
    InvalidHandle {
        kind: &'static str,
        handle: Handle,
    },

    /// Every slot of the pool is occupied.
    #[error("Pool '{pool}' exhausted (capacity: {capacity})")]
    PoolExhausted { pool: &'static str, capacity: u32 },

    /// Requested capacity exceeds the 24-bit index budget.
    #[error("Invalid pool capacity {capacity} (max: {max})")]
    InvalidCapacity { capacity: u32, max: u32 },

    /// The injected allocator refused a reservation.
    #[error("Allocation of {bytes} bytes for '{label}' refused by allocator")]
    AllocationRefused { label: &'static str, bytes: usize },

    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// A transform was asked to become its own parent.
    #[error("Transform {0:?} cannot be its own parent")]
    SelfParent(Handle),

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    #[error("Skeleton must have at least one joint")]
    EmptySkeleton,

    #[error("Skeleton has {count} joints (max: {max})")]
    TooManyJoints { count: usize, max: usize },

    /// Joints must be listed parents-first.
    #[error("Joint {joint} has parent index {parent}, which does not precede it")]
    NonTopologicalJoint { joint: usize, parent: i16 },

    #[error("Bind pose has {actual} entries, skeleton has {expected} joints")]
    BindPoseLength { expected: usize, actual: usize },

    // ========================================================================
    // Animation Errors
    // ========================================================================
    #[error("Animation channel {channel} has no keyframes")]
    EmptyChannel { channel: usize },

    #[error("Animation channel {channel} has {times} key times but {values} values")]
    KeyframeCountMismatch {
        channel: usize,
        times: usize,
        values: usize,
    },

    /// Key times must be strictly ascending.
    #[error("Animation channel {channel}: key time {index} is not after its predecessor")]
    UnsortedKeyframes { channel: usize, index: usize },

    /// Vec3 samples must drive translation/scale, quaternion samples rotation.
    #[error("Animation channel {channel}: sampler type does not match the targeted DOF")]
    SamplerMismatch { channel: usize },

    #[error("Invalid animation duration: {0}")]
    InvalidDuration(f32),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EmberError {
    #[inline]
    pub fn invalid_handle(kind: &'static str, handle: impl Into<Handle>) -> Self {
        Self::InvalidHandle {
            kind,
            handle: handle.into(),
        }
    }
}

/// Alias for `Result<T, EmberError>`.
pub type Result<T> = std::result::Result<T, EmberError>;
