use ember_core::trs_matrix;
use glam::{Mat4, Quat, Vec3};

use crate::TransformId;
use crate::uniforms::UniformDataId;

/// A node of the transform hierarchy.
///
/// Holds the local TRS, a memoized local matrix and the intrusive hierarchy
/// links. Children of one parent form a doubly linked list through
/// `prev_sibling` / `next_sibling`, headed by the parent's `first_child`.
/// Links are keys into the owning pool, never references.
///
/// Nodes live inside a [`TransformSystem`](crate::TransformSystem); all
/// mutation goes through it so the links stay consistent.
#[derive(Debug, Clone)]
pub struct Transform {
    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) scale: Vec3,

    local_matrix: Mat4,
    local_dirty: bool,

    pub(crate) parent: Option<TransformId>,
    pub(crate) first_child: Option<TransformId>,
    pub(crate) prev_sibling: Option<TransformId>,
    pub(crate) next_sibling: Option<TransformId>,

    pub(crate) uniform_data: UniformDataId,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Mat4::IDENTITY,
            local_dirty: true,

            parent: None,
            first_child: None,
            prev_sibling: None,
            next_sibling: None,

            uniform_data: UniformDataId::NONE,
        }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.local_dirty = true;
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.local_dirty = true;
    }

    #[inline]
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.local_dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    /// `T * R * S`, recomputed only if a setter ran since the last call.
    pub fn local_matrix(&mut self) -> Mat4 {
        if self.local_dirty {
            self.local_matrix = trs_matrix(self.position, self.rotation, self.scale);
            self.local_dirty = false;
        }
        self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn first_child(&self) -> Option<TransformId> {
        self.first_child
    }

    #[inline]
    #[must_use]
    pub fn next_sibling(&self) -> Option<TransformId> {
        self.next_sibling
    }

    #[inline]
    #[must_use]
    pub fn prev_sibling(&self) -> Option<TransformId> {
        self.prev_sibling
    }

    #[inline]
    #[must_use]
    pub fn uniform_data(&self) -> UniformDataId {
        self.uniform_data
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
