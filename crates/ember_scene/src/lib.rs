//! Scene Graph
//!
//! The transform hierarchy of the Ember engine:
//! - [`Transform`]: local TRS, memoized local matrix, intrusive hierarchy links
//! - [`TransformSystem`]: the pool owner and the only place links are edited
//! - [`UniformBackend`]: seam to the external GPU layer for per-transform data

pub mod transform;
pub mod transform_system;
pub mod uniforms;

pub use transform::Transform;
pub use transform_system::{Children, TransformSystem};
pub use uniforms::{HeadlessUniforms, TransformUniforms, UniformBackend, UniformDataId};

ember_core::define_handle! {
    /// Handle to a node of the transform hierarchy.
    pub struct TransformId;
}
