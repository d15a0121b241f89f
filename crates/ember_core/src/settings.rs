//! Engine Settings
//!
//! Pool capacities for each subsystem. Every pool is sized once at startup and
//! never grows, so these numbers are the hard object limits of an engine
//! instance.
//!
//! ```rust
//! use ember_core::EngineSettings;
//!
//! let settings = EngineSettings {
//!     max_num_skeletons: 8,
//!     ..Default::default()
//! };
//! assert_eq!(settings.max_num_transforms, 1024);
//!
//! let settings = EngineSettings::from_json_str(r#"{ "max_num_animations": 32 }"#).unwrap();
//! assert_eq!(settings.animation_capacity(), 32);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub const DEFAULT_MAX_TRANSFORMS: u32 = 1024;
pub const DEFAULT_MAX_SKELETONS: u32 = 64;
pub const DEFAULT_MAX_ANIMATIONS: u32 = 256;

/// A value of `0` in any field selects that field's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub max_num_transforms: u32,
    pub max_num_skeletons: u32,
    pub max_num_animations: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_num_transforms: DEFAULT_MAX_TRANSFORMS,
            max_num_skeletons: DEFAULT_MAX_SKELETONS,
            max_num_animations: DEFAULT_MAX_ANIMATIONS,
        }
    }
}

#[inline]
fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 { default } else { value }
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn transform_capacity(&self) -> u32 {
        or_default(self.max_num_transforms, DEFAULT_MAX_TRANSFORMS)
    }

    #[must_use]
    pub fn skeleton_capacity(&self) -> u32 {
        or_default(self.max_num_skeletons, DEFAULT_MAX_SKELETONS)
    }

    #[must_use]
    pub fn animation_capacity(&self) -> u32 {
        or_default(self.max_num_animations, DEFAULT_MAX_ANIMATIONS)
    }
}
