//! Per-transform GPU uniform data.
//!
//! The GPU abstraction is external. Transforms only need to create, update and
//! destroy one uniform block each, so that is the whole [`UniformBackend`]
//! surface. [`HeadlessUniforms`] keeps the blocks in memory and is what tests
//! and headless tools plug in.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use rustc_hash::FxHashMap;

/// Opaque id of a backend-owned uniform block. `0` means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniformDataId(pub u64);

impl UniformDataId {
    pub const NONE: Self = Self(0);

    #[inline]
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

pub trait UniformBackend {
    /// Allocates a block of `size` bytes, rewritten every frame.
    fn create_uniform_data(&mut self, size: usize) -> UniformDataId;

    fn update_uniform_data(&mut self, id: UniformDataId, bytes: &[u8]);

    fn destroy_uniform_data(&mut self, id: UniformDataId);
}

/// Layout of the per-transform block consumed by shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformUniforms {
    pub model: [f32; 16],
    pub model_inv: [f32; 16],
    pub model_view: [f32; 16],
    pub model_view_projection: [f32; 16],
}

impl TransformUniforms {
    #[must_use]
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        let model_view = view * model;
        Self {
            model: model.to_cols_array(),
            model_inv: model.inverse().to_cols_array(),
            model_view: model_view.to_cols_array(),
            model_view_projection: (projection * model_view).to_cols_array(),
        }
    }
}

/// In-memory backend: every block is a byte vector.
#[derive(Debug)]
pub struct HeadlessUniforms {
    blocks: FxHashMap<UniformDataId, Vec<u8>>,
    next_id: u64,
}

impl Default for HeadlessUniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessUniforms {
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: FxHashMap::default(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn data(&self, id: UniformDataId) -> Option<&[u8]> {
        self.blocks.get(&id).map(Vec::as_slice)
    }

    /// Number of blocks currently alive.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl UniformBackend for HeadlessUniforms {
    fn create_uniform_data(&mut self, size: usize) -> UniformDataId {
        let id = UniformDataId(self.next_id);
        self.next_id += 1;
        self.blocks.insert(id, vec![0; size]);
        id
    }

    fn update_uniform_data(&mut self, id: UniformDataId, bytes: &[u8]) {
        match self.blocks.get_mut(&id) {
            Some(block) => {
                debug_assert_eq!(block.len(), bytes.len(), "uniform block size mismatch");
                block.clear();
                block.extend_from_slice(bytes);
            }
            None => log::warn!("Update of unknown uniform block {id:?}"),
        }
    }

    fn destroy_uniform_data(&mut self, id: UniformDataId) {
        if self.blocks.remove(&id).is_none() {
            log::warn!("Destroy of unknown uniform block {id:?}");
        }
    }
}
