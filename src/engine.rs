//! Engine Context
//!
//! [`Engine`] bundles one instance of each subsystem, sized from
//! [`EngineSettings`] and sharing one [`Allocator`]. There is no global state:
//! several engines can live side by side, each with its own pools.
//!
//! # Example
//!
//! ```rust
//! use ember::{Engine, EngineSettings};
//!
//! let mut engine = Engine::headless(EngineSettings::default())?;
//! let node = engine.transforms.create()?;
//! engine.transforms.set_position(node, glam::Vec3::X)?;
//! # Ok::<(), ember::EmberError>(())
//! ```

use std::sync::Arc;

use ember_animation::AnimationSystem;
use ember_core::{Allocator, EngineSettings, Result, default_allocator};
use ember_scene::{HeadlessUniforms, TransformSystem, UniformBackend};

/// The engine context: transform hierarchy plus skeletal animation.
///
/// `B` is the uniform backend that receives per-transform GPU data.
pub struct Engine<B: UniformBackend = HeadlessUniforms> {
    pub transforms: TransformSystem<B>,
    pub animation: AnimationSystem,

    settings: EngineSettings,
    allocator: Arc<dyn Allocator>,
}

impl Engine<HeadlessUniforms> {
    /// An engine whose uniform data stays in memory.
    pub fn headless(settings: EngineSettings) -> Result<Self> {
        Self::new(settings, HeadlessUniforms::default())
    }
}

impl<B: UniformBackend> Engine<B> {
    pub fn new(settings: EngineSettings, backend: B) -> Result<Self> {
        Self::with_allocator(settings, backend, default_allocator())
    }

    /// Creates every subsystem, reserving its pools through `allocator`.
    pub fn with_allocator(
        settings: EngineSettings,
        backend: B,
        allocator: Arc<dyn Allocator>,
    ) -> Result<Self> {
        let transforms =
            TransformSystem::new(settings.transform_capacity(), allocator.clone(), backend)?;
        let animation = AnimationSystem::new(
            settings.skeleton_capacity(),
            settings.animation_capacity(),
            allocator.clone(),
        )?;

        log::debug!(
            "Engine initialized: {} transforms, {} skeletons, {} animations",
            settings.transform_capacity(),
            settings.skeleton_capacity(),
            settings.animation_capacity()
        );

        Ok(Self {
            transforms,
            animation,
            settings,
            allocator,
        })
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn allocator(&self) -> &Arc<dyn Allocator> {
        &self.allocator
    }
}
