//! Skeletal Animation
//!
//! - [`Skeleton`]: parents-first joint array, pose buffer, skin matrices
//! - [`Animation`]: immutable per-joint TRS channels, sampled by time
//! - [`blend_poses`]: weighted pose mixing with hemisphere-corrected rotations
//! - [`AnimationAction`]: playhead and loop mode for one playing animation
//! - [`AnimationSystem`]: pool owner for skeletons and animations

pub mod action;
pub mod animation;
pub mod blend;
pub mod joint;
pub mod skeleton;
pub mod system;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use animation::{Animation, Channel, ChannelData, ChannelTarget, JointDof};
pub use blend::blend_poses;
pub use joint::{JointTransform, SkeletonJoint};
pub use skeleton::Skeleton;
pub use system::AnimationSystem;
pub use tracks::{InterpolationMode, KeyframeTrack, find_interval};
pub use values::Interpolatable;

ember_core::define_handle! {
    pub struct SkeletonId;
}

ember_core::define_handle! {
    pub struct AnimationId;
}
