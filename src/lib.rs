//! Ember
//!
//! Core object model of a small real-time engine:
//! - generational handles, slot maps and fixed-capacity pools ([`ember_core`])
//! - the transform hierarchy ([`ember_scene`])
//! - skeletal animation sampling and blending ([`ember_animation`])
//!
//! [`Engine`] wires one instance of each subsystem together.

pub mod engine;

pub use ember_animation;
pub use ember_core;
pub use ember_scene;

pub use engine::Engine;

pub use ember_animation::{
    Animation, AnimationAction, AnimationId, AnimationSystem, Channel, InterpolationMode,
    JointTransform, KeyframeTrack, LoopMode, Skeleton, SkeletonId, SkeletonJoint, blend_poses,
};
pub use ember_core::{
    Allocator, EmberError, EngineSettings, Handle, Result, SystemAllocator, TrackingAllocator,
};
pub use ember_scene::{HeadlessUniforms, TransformId, TransformSystem, TransformUniforms, UniformBackend};
