//! Transform System
//!
//! Owns the transform pool and keeps the hierarchy links consistent.
//!
//! # Matrices
//!
//! - The local matrix is memoized per node and invalidated by every setter.
//! - The world matrix has no cache: [`TransformSystem::world_matrix`] folds
//!   `parent_world * local` down from the root on each call, O(depth).
//! - [`TransformSystem::update_world_matrices`] computes every world matrix in
//!   one top-down pass; its results are bit-identical to the per-node query.
//!
//! # Hierarchy
//!
//! Children of a node form an intrusive doubly linked list. [`set_parent`]
//! pushes at the head of the new parent's list. There is no cycle detection:
//! parenting a node under its own descendant makes world-matrix queries loop
//! forever.
//!
//! [`set_parent`]: TransformSystem::set_parent

use std::sync::Arc;

use ember_core::{Allocator, EmberError, Pool, Result};
use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use crate::TransformId;
use crate::transform::Transform;
use crate::uniforms::{TransformUniforms, UniformBackend};

const KIND: &str = "transform";

pub struct TransformSystem<B: UniformBackend> {
    transforms: Pool<TransformId, Transform>,
    backend: B,
}

impl<B: UniformBackend> TransformSystem<B> {
    pub fn new(capacity: u32, allocator: Arc<dyn Allocator>, backend: B) -> Result<Self> {
        Ok(Self {
            transforms: Pool::new(capacity, "transforms", allocator)?,
            backend,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Creates a root transform with identity TRS and its uniform block.
    pub fn create(&mut self) -> Result<TransformId> {
        let capacity = self.transforms.capacity();
        let Some((id, transform)) = self.transforms.insert() else {
            return Err(EmberError::PoolExhausted {
                pool: "transforms",
                capacity,
            });
        };

        transform.uniform_data = self
            .backend
            .create_uniform_data(std::mem::size_of::<TransformUniforms>());
        Ok(id)
    }

    /// Removes a transform, keeping its children in the hierarchy.
    ///
    /// - With a parent: the children take the destroyed node's place in the
    ///   parent's child list, in their existing order.
    /// - Without a parent: the children become roots.
    pub fn destroy(&mut self, id: TransformId) -> Result<()> {
        let node = self.node(id)?;
        let (parent, first_child) = (node.parent, node.first_child);
        let (prev, next) = (node.prev_sibling, node.next_sibling);

        match (first_child, parent) {
            (Some(first_child), Some(parent)) => {
                let mut last_child = first_child;
                let mut cursor = Some(first_child);
                while let Some(child_id) = cursor {
                    let child = self.node_mut(child_id)?;
                    child.parent = Some(parent);
                    last_child = child_id;
                    cursor = child.next_sibling;
                }

                let parent_node = self.node_mut(parent)?;
                if parent_node.first_child == Some(id) {
                    debug_assert!(prev.is_none());
                    parent_node.first_child = Some(first_child);
                } else {
                    debug_assert!(prev.is_some());
                    self.link(prev, Some(first_child));
                }
                self.link(Some(last_child), next);
            }
            (Some(first_child), None) => {
                let mut cursor = Some(first_child);
                while let Some(child_id) = cursor {
                    let child = self.node_mut(child_id)?;
                    cursor = child.next_sibling;
                    child.parent = None;
                    child.prev_sibling = None;
                    child.next_sibling = None;
                }
            }
            (None, Some(parent)) => {
                self.link(prev, next);
                let parent_node = self.node_mut(parent)?;
                if parent_node.first_child == Some(id) {
                    parent_node.first_child = next;
                }
            }
            (None, None) => {}
        }

        if let Some(removed) = self.transforms.remove(id) {
            self.backend.destroy_uniform_data(removed.uniform_data);
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: TransformId) -> bool {
        self.transforms.contains(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.transforms.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.transforms.capacity()
    }

    pub fn get(&self, id: TransformId) -> Result<&Transform> {
        self.node(id)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ========================================================================
    // Local TRS
    // ========================================================================

    pub fn set_position(&mut self, id: TransformId, position: Vec3) -> Result<()> {
        self.node_mut(id)?.set_position(position);
        Ok(())
    }

    pub fn set_orientation(&mut self, id: TransformId, orientation: Quat) -> Result<()> {
        self.node_mut(id)?.set_rotation(orientation);
        Ok(())
    }

    pub fn set_scale(&mut self, id: TransformId, scale: Vec3) -> Result<()> {
        self.node_mut(id)?.set_scale(scale);
        Ok(())
    }

    pub fn set_uniform_scale(&mut self, id: TransformId, scale: f32) -> Result<()> {
        self.set_scale(id, Vec3::splat(scale))
    }

    pub fn position(&self, id: TransformId) -> Result<Vec3> {
        Ok(self.node(id)?.position)
    }

    pub fn orientation(&self, id: TransformId) -> Result<Quat> {
        Ok(self.node(id)?.rotation)
    }

    pub fn scale(&self, id: TransformId) -> Result<Vec3> {
        Ok(self.node(id)?.scale)
    }

    /// Orients the transform so its -Z axis points at `target`.
    ///
    /// `target` and `up` are in the parent's space. Without `up`, one is
    /// derived as `look × (look × Y)`; that vector vanishes when `target` lies
    /// straight above or below, and the resulting orientation is not finite.
    pub fn look_at(&mut self, id: TransformId, target: Vec3, up: Option<Vec3>) -> Result<()> {
        let node = self.node_mut(id)?;
        let up = up.unwrap_or_else(|| {
            let look = target - node.position;
            if is_parallel_to_up(look) {
                log::warn!("look_at: direction {look} is parallel to world up, orientation is undefined");
            }
            let right = look.cross(Vec3::Y);
            look.cross(right).normalize()
        });

        let view = Mat4::look_at_rh(node.position, target, up);
        node.set_rotation(Quat::from_mat4(&view).conjugate().normalize());
        Ok(())
    }

    /// Rotates a local direction by this transform's own orientation.
    pub fn local_to_world(&self, id: TransformId, direction: Vec3) -> Result<Vec3> {
        Ok(self.node(id)?.rotation * direction)
    }

    // ========================================================================
    // Matrices
    // ========================================================================

    pub fn local_matrix(&mut self, id: TransformId) -> Result<Mat4> {
        Ok(self.node_mut(id)?.local_matrix())
    }

    /// `world(parent) * local`, walking to the root on every call.
    pub fn world_matrix(&mut self, id: TransformId) -> Result<Mat4> {
        let mut chain: SmallVec<[TransformId; 16]> = SmallVec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.node(current)?.parent;
        }

        let mut world: Option<Mat4> = None;
        for &ancestor in chain.iter().rev() {
            let local = self.node_mut(ancestor)?.local_matrix();
            world = Some(world.map_or(local, |parent_world| parent_world * local));
        }
        Ok(world.unwrap_or(Mat4::IDENTITY))
    }

    /// Column-major copy of the local matrix.
    pub fn local_matrix_cols(&mut self, id: TransformId, out: &mut [f32; 16]) -> Result<()> {
        *out = self.local_matrix(id)?.to_cols_array();
        Ok(())
    }

    /// Column-major copy of the world matrix.
    pub fn world_matrix_cols(&mut self, id: TransformId, out: &mut [f32; 16]) -> Result<()> {
        *out = self.world_matrix(id)?.to_cols_array();
        Ok(())
    }

    /// Computes all world matrices top-down in a single traversal.
    ///
    /// Parents are always emitted before their children.
    pub fn update_world_matrices(&mut self) -> Vec<(TransformId, Mat4)> {
        let mut stack: Vec<(TransformId, Option<Mat4>)> = self
            .transforms
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| (id, None))
            .collect();
        stack.reverse();

        let mut out = Vec::with_capacity(self.transforms.len() as usize);
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.transforms.get_mut(id) else {
                continue;
            };
            let local = node.local_matrix();
            let world = parent_world.map_or(local, |parent_world| parent_world * local);
            out.push((id, world));

            let mut child = node.first_child;
            let mark = stack.len();
            while let Some(child_id) = child {
                stack.push((child_id, Some(world)));
                child = self.transforms.get(child_id).and_then(|c| c.next_sibling);
            }
            stack[mark..].reverse();
        }
        out
    }

    /// Uploads model / inverse / model-view / MVP for one transform.
    pub fn write_uniforms(&mut self, id: TransformId, view: Mat4, projection: Mat4) -> Result<()> {
        let model = self.world_matrix(id)?;
        let block = TransformUniforms::new(model, view, projection);
        let uniform_data = self.node(id)?.uniform_data;
        self.backend
            .update_uniform_data(uniform_data, bytemuck::bytes_of(&block));
        Ok(())
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Detaches `id` from its current parent, then (if `parent` is `Some`)
    /// makes it the parent's first child.
    pub fn set_parent(&mut self, id: TransformId, parent: Option<TransformId>) -> Result<()> {
        if parent == Some(id) {
            return Err(EmberError::SelfParent(id.handle()));
        }
        let current_parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        if current_parent.is_some() {
            self.unparent(id)?;
        }

        if let Some(parent) = parent {
            let previous_first = self.node(parent)?.first_child;
            self.node_mut(id)?.parent = Some(parent);
            self.link(Some(id), previous_first);
            self.node_mut(parent)?.first_child = Some(id);
        }
        Ok(())
    }

    pub fn parent(&self, id: TransformId) -> Result<Option<TransformId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn first_child(&self, id: TransformId) -> Result<Option<TransformId>> {
        Ok(self.node(id)?.first_child)
    }

    pub fn next_sibling(&self, id: TransformId) -> Result<Option<TransformId>> {
        Ok(self.node(id)?.next_sibling)
    }

    pub fn prev_sibling(&self, id: TransformId) -> Result<Option<TransformId>> {
        Ok(self.node(id)?.prev_sibling)
    }

    /// Iterates the direct children of `id`, first child first.
    pub fn children(&self, id: TransformId) -> Result<Children<'_, B>> {
        Ok(Children {
            system: self,
            next: self.node(id)?.first_child,
        })
    }

    /// Transforms without a parent, in slot order.
    pub fn roots(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.transforms
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    fn unparent(&mut self, id: TransformId) -> Result<()> {
        let node = self.node(id)?;
        let Some(parent) = node.parent else {
            return Ok(());
        };
        let (prev, next) = (node.prev_sibling, node.next_sibling);

        self.link(prev, next);
        let parent_node = self.node_mut(parent)?;
        if parent_node.first_child == Some(id) {
            debug_assert!(prev.is_none());
            parent_node.first_child = next;
        }

        let node = self.node_mut(id)?;
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        Ok(())
    }

    /// Makes `prev` and `next` adjacent; a `None` side terminates the list.
    fn link(&mut self, prev: Option<TransformId>, next: Option<TransformId>) {
        if let Some(prev_node) = prev.and_then(|p| self.transforms.get_mut(p)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|n| self.transforms.get_mut(n)) {
            next_node.prev_sibling = prev;
        }
    }

    #[inline]
    fn node(&self, id: TransformId) -> Result<&Transform> {
        self.transforms
            .get(id)
            .ok_or_else(|| EmberError::invalid_handle(KIND, id))
    }

    #[inline]
    fn node_mut(&mut self, id: TransformId) -> Result<&mut Transform> {
        self.transforms
            .get_mut(id)
            .ok_or_else(|| EmberError::invalid_handle(KIND, id))
    }
}

/// Iterator over the direct children of a transform.
pub struct Children<'a, B: UniformBackend> {
    system: &'a TransformSystem<B>,
    next: Option<TransformId>,
}

impl<B: UniformBackend> Iterator for Children<'_, B> {
    type Item = TransformId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self
            .system
            .transforms
            .get(current)
            .and_then(|node| node.next_sibling);
        Some(current)
    }
}

/// Compares directions, not magnitudes, so distance to the target does not
/// change the verdict.
fn is_parallel_to_up(look: Vec3) -> bool {
    look.normalize_or_zero().cross(Vec3::Y).length_squared() <= f32::EPSILON
}
