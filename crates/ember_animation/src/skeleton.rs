use std::mem;

use ember_core::{EmberError, Result, decompose_trs};
use glam::Mat4;

use crate::joint::{JointTransform, SkeletonJoint};

/// A joint hierarchy together with its pose and matrix buffers.
///
/// Joints are stored parents-first, so one forward pass over the array is
/// enough to resolve every global transform.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<SkeletonJoint>,

    /// Rest pose captured at creation.
    local_bind: Vec<JointTransform>,

    // === Runtime Data ===
    // Pose written by sampling/blending each frame, then turned into matrices
    pose: Vec<JointTransform>,
    global_transforms: Vec<Mat4>,
    skin_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// Copies the topology of `joints`.
    ///
    /// When `local_bind` is `None` the rest pose is recovered from the inverse
    /// bind matrices.
    pub fn new(joints: &[SkeletonJoint], local_bind: Option<&[JointTransform]>) -> Result<Self> {
        let count = joints.len();
        if count == 0 {
            return Err(EmberError::EmptySkeleton);
        }
        if count > i16::MAX as usize {
            return Err(EmberError::TooManyJoints {
                count,
                max: i16::MAX as usize,
            });
        }

        for (index, joint) in joints.iter().enumerate() {
            if joint.parent().is_some_and(|parent| parent >= index) {
                return Err(EmberError::NonTopologicalJoint {
                    joint: index,
                    parent: joint.parent_index,
                });
            }
        }

        let local_bind = match local_bind {
            Some(bind) if bind.len() != count => {
                return Err(EmberError::BindPoseLength {
                    expected: count,
                    actual: bind.len(),
                });
            }
            Some(bind) => bind.to_vec(),
            None => derive_local_bind(joints),
        };

        Ok(Self {
            joints: joints.to_vec(),
            pose: local_bind.clone(),
            local_bind,
            global_transforms: vec![Mat4::IDENTITY; count],
            skin_matrices: vec![Mat4::IDENTITY; count],
        })
    }

    #[inline]
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[SkeletonJoint] {
        &self.joints
    }

    #[inline]
    #[must_use]
    pub fn local_bind(&self) -> &[JointTransform] {
        &self.local_bind
    }

    pub fn reset_to_bind_pose(&mut self) {
        self.pose.copy_from_slice(&self.local_bind);
    }

    #[inline]
    #[must_use]
    pub fn joint_transforms(&self) -> &[JointTransform] {
        &self.pose
    }

    /// The pose buffer. Overwrite it before calling
    /// [`update_joint_matrices`](Self::update_joint_matrices).
    #[inline]
    pub fn joint_transforms_mut(&mut self) -> &mut [JointTransform] {
        &mut self.pose
    }

    /// Recomputes global and skin matrices from the current pose.
    ///
    /// Nothing is cached between calls; call it once per frame at most.
    pub fn update_joint_matrices(&mut self) -> &[Mat4] {
        for (i, joint) in self.joints.iter().enumerate() {
            let local = self.pose[i].to_matrix();
            let global = match joint.parent() {
                Some(parent) => self.global_transforms[parent] * local,
                None => local,
            };
            self.global_transforms[i] = global;
            self.skin_matrices[i] = global * joint.inverse_bind_matrix;
        }
        &self.skin_matrices
    }

    #[inline]
    #[must_use]
    pub fn global_transforms(&self) -> &[Mat4] {
        &self.global_transforms
    }

    #[inline]
    #[must_use]
    pub fn skin_matrices(&self) -> &[Mat4] {
        &self.skin_matrices
    }

    /// Bytes held by the per-joint arrays.
    #[must_use]
    pub fn heap_bytes(&self) -> usize {
        Self::heap_bytes_for(self.joints.len())
    }

    #[must_use]
    pub fn heap_bytes_for(num_joints: usize) -> usize {
        num_joints
            * (mem::size_of::<SkeletonJoint>()
                + 2 * mem::size_of::<JointTransform>()
                + 2 * mem::size_of::<Mat4>())
    }
}

fn derive_local_bind(joints: &[SkeletonJoint]) -> Vec<JointTransform> {
    let bind_globals: Vec<Mat4> = joints
        .iter()
        .map(|joint| joint.inverse_bind_matrix.inverse())
        .collect();

    joints
        .iter()
        .enumerate()
        .map(|(i, joint)| {
            let local = match joint.parent() {
                Some(parent) => bind_globals[parent].inverse() * bind_globals[i],
                None => bind_globals[i],
            };
            let (translation, rotation, scale) = decompose_trs(&local);
            JointTransform {
                translation,
                rotation,
                scale,
            }
        })
        .collect()
}
