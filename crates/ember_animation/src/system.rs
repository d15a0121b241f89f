//! Animation System
//!
//! Owns the skeleton and animation pools. Every per-object buffer (joint
//! arrays, keyframe arrays) is accounted through the injected [`Allocator`]
//! on creation and returned on destruction.
//!
//! A typical frame:
//! 1. [`AnimationSystem::advance_action`] for each playing action
//! 2. [`AnimationSystem::sample`] / [`blend_poses`](crate::blend_poses) into
//!    the skeleton's [`joint_transforms_mut`](AnimationSystem::joint_transforms_mut)
//! 3. [`AnimationSystem::update_joint_matrices`] once per skeleton
//!
//! The system does not enforce this ordering; skipping step 2 only leaves the
//! previous pose in place.

use std::sync::Arc;

use ember_core::{Allocator, EmberError, Pool, Result};
use glam::Mat4;

use crate::action::AnimationAction;
use crate::animation::{Animation, Channel};
use crate::joint::{JointTransform, SkeletonJoint};
use crate::skeleton::Skeleton;
use crate::{AnimationId, SkeletonId};

const SKELETON: &str = "skeleton";
const ANIMATION: &str = "animation";

const SKELETON_DATA: &str = "skeleton joints";
const ANIMATION_DATA: &str = "animation channels";

pub struct AnimationSystem {
    skeletons: Pool<SkeletonId, Skeleton>,
    animations: Pool<AnimationId, Animation>,
    allocator: Arc<dyn Allocator>,
}

impl AnimationSystem {
    pub fn new(
        skeleton_capacity: u32,
        animation_capacity: u32,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self> {
        Ok(Self {
            skeletons: Pool::new(skeleton_capacity, "skeletons", allocator.clone())?,
            animations: Pool::new(animation_capacity, "animations", allocator.clone())?,
            allocator,
        })
    }

    // ========================================================================
    // Skeletons
    // ========================================================================

    pub fn create_skeleton(
        &mut self,
        joints: &[SkeletonJoint],
        local_bind: Option<&[JointTransform]>,
    ) -> Result<SkeletonId> {
        let capacity = self.skeletons.capacity();
        if self.skeletons.len() == capacity {
            return Err(EmberError::PoolExhausted {
                pool: "skeletons",
                capacity,
            });
        }

        let skeleton = Skeleton::new(joints, local_bind)?;
        let bytes = skeleton.heap_bytes();
        self.allocator.allocate(bytes, SKELETON_DATA)?;

        let Some((id, slot)) = self.skeletons.insert() else {
            self.allocator.deallocate(bytes, SKELETON_DATA);
            return Err(EmberError::PoolExhausted {
                pool: "skeletons",
                capacity,
            });
        };
        *slot = skeleton;

        log::debug!("Skeleton {id:?} created with {} joints", joints.len());
        Ok(id)
    }

    pub fn destroy_skeleton(&mut self, id: SkeletonId) -> Result<()> {
        let skeleton = self
            .skeletons
            .remove(id)
            .ok_or_else(|| EmberError::invalid_handle(SKELETON, id))?;
        self.allocator.deallocate(skeleton.heap_bytes(), SKELETON_DATA);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn contains_skeleton(&self, id: SkeletonId) -> bool {
        self.skeletons.contains(id)
    }

    pub fn skeleton(&self, id: SkeletonId) -> Result<&Skeleton> {
        self.skeletons
            .get(id)
            .ok_or_else(|| EmberError::invalid_handle(SKELETON, id))
    }

    pub fn skeleton_mut(&mut self, id: SkeletonId) -> Result<&mut Skeleton> {
        self.skeletons
            .get_mut(id)
            .ok_or_else(|| EmberError::invalid_handle(SKELETON, id))
    }

    pub fn num_joints(&self, id: SkeletonId) -> Result<usize> {
        Ok(self.skeleton(id)?.num_joints())
    }

    pub fn reset_to_bind_pose(&mut self, id: SkeletonId) -> Result<()> {
        self.skeleton_mut(id)?.reset_to_bind_pose();
        Ok(())
    }

    pub fn joint_transforms(&self, id: SkeletonId) -> Result<&[JointTransform]> {
        Ok(self.skeleton(id)?.joint_transforms())
    }

    pub fn joint_transforms_mut(&mut self, id: SkeletonId) -> Result<&mut [JointTransform]> {
        Ok(self.skeleton_mut(id)?.joint_transforms_mut())
    }

    /// Recomputes global and skin matrices from the pose buffer and returns
    /// the skin matrices.
    pub fn update_joint_matrices(&mut self, id: SkeletonId) -> Result<&[Mat4]> {
        Ok(self.skeleton_mut(id)?.update_joint_matrices())
    }

    pub fn global_transforms(&self, id: SkeletonId) -> Result<&[Mat4]> {
        Ok(self.skeleton(id)?.global_transforms())
    }

    pub fn skin_matrices(&self, id: SkeletonId) -> Result<&[Mat4]> {
        Ok(self.skeleton(id)?.skin_matrices())
    }

    // ========================================================================
    // Animations
    // ========================================================================

    /// Copies `channels` into a new immutable animation.
    pub fn create_animation(
        &mut self,
        name: &str,
        channels: &[Channel],
        duration: Option<f32>,
    ) -> Result<AnimationId> {
        let capacity = self.animations.capacity();
        if self.animations.len() == capacity {
            return Err(EmberError::PoolExhausted {
                pool: "animations",
                capacity,
            });
        }

        let animation = Animation::new(name, channels, duration)?;
        let bytes = animation.heap_bytes();
        self.allocator.allocate(bytes, ANIMATION_DATA)?;

        let Some((id, slot)) = self.animations.insert() else {
            self.allocator.deallocate(bytes, ANIMATION_DATA);
            return Err(EmberError::PoolExhausted {
                pool: "animations",
                capacity,
            });
        };

        log::debug!(
            "Animation '{name}' {id:?} created: {} channels, {:.3}s",
            channels.len(),
            animation.duration()
        );
        *slot = animation;
        Ok(id)
    }

    pub fn destroy_animation(&mut self, id: AnimationId) -> Result<()> {
        let animation = self
            .animations
            .remove(id)
            .ok_or_else(|| EmberError::invalid_handle(ANIMATION, id))?;
        self.allocator.deallocate(animation.heap_bytes(), ANIMATION_DATA);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn contains_animation(&self, id: AnimationId) -> bool {
        self.animations.contains(id)
    }

    pub fn animation(&self, id: AnimationId) -> Result<&Animation> {
        self.animations
            .get(id)
            .ok_or_else(|| EmberError::invalid_handle(ANIMATION, id))
    }

    pub fn duration(&self, id: AnimationId) -> Result<f32> {
        Ok(self.animation(id)?.duration())
    }

    /// Samples `id` at `time` into a caller-owned pose buffer.
    pub fn sample(&self, id: AnimationId, time: f32, joints: &mut [JointTransform]) -> Result<()> {
        self.animation(id)?.sample(time, joints);
        Ok(())
    }

    /// Samples straight into a skeleton's pose buffer.
    pub fn sample_into_skeleton(
        &mut self,
        animation: AnimationId,
        skeleton: SkeletonId,
        time: f32,
    ) -> Result<()> {
        let animation = self
            .animations
            .get(animation)
            .ok_or_else(|| EmberError::invalid_handle(ANIMATION, animation))?;
        let skeleton = self
            .skeletons
            .get_mut(skeleton)
            .ok_or_else(|| EmberError::invalid_handle(SKELETON, skeleton))?;

        animation.sample(time, skeleton.joint_transforms_mut());
        Ok(())
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn advance_action(&self, action: &mut AnimationAction, dt: f32) -> Result<()> {
        let duration = self.duration(action.animation())?;
        action.advance(dt, duration);
        Ok(())
    }

    /// Samples the action's animation at its playhead into `joints`.
    pub fn sample_action(&self, action: &AnimationAction, joints: &mut [JointTransform]) -> Result<()> {
        self.sample(action.animation(), action.time, joints)
    }

    pub fn apply_action(&mut self, action: &AnimationAction, skeleton: SkeletonId) -> Result<()> {
        self.sample_into_skeleton(action.animation(), skeleton, action.time)
    }

    #[inline]
    #[must_use]
    pub fn num_skeletons(&self) -> u32 {
        self.skeletons.len()
    }

    #[inline]
    #[must_use]
    pub fn num_animations(&self) -> u32 {
        self.animations.len()
    }
}

impl Drop for AnimationSystem {
    fn drop(&mut self) {
        for (_, skeleton) in self.skeletons.iter() {
            self.allocator.deallocate(skeleton.heap_bytes(), SKELETON_DATA);
        }
        for (_, animation) in self.animations.iter() {
            self.allocator.deallocate(animation.heap_bytes(), ANIMATION_DATA);
        }
    }
}
