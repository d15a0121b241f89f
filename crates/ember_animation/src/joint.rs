use ember_core::trs_matrix;
use glam::{Mat4, Quat, Vec3};

/// Local TRS of one joint.
///
/// Buffers of these are what animation sampling writes, what pose blending
/// combines and what a skeleton turns into matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl JointTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        trs_matrix(self.translation, self.rotation, self.scale)
    }
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Static description of a joint: where it sits in the hierarchy and how to
/// bring mesh-space vertices into its local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonJoint {
    pub inverse_bind_matrix: Mat4,
    /// Index of the parent joint, negative for roots. Must be smaller than the
    /// joint's own index.
    pub parent_index: i16,
}

impl SkeletonJoint {
    #[must_use]
    pub fn root(inverse_bind_matrix: Mat4) -> Self {
        Self {
            inverse_bind_matrix,
            parent_index: -1,
        }
    }

    #[must_use]
    pub fn child_of(parent_index: i16, inverse_bind_matrix: Mat4) -> Self {
        Self {
            inverse_bind_matrix,
            parent_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent_index).ok()
    }
}
