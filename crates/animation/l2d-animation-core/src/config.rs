//! Animator configuration.

use serde::{Deserialize, Serialize};

use crate::layer::LayerConfig;

/// A layer to create at build time, in evaluation order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NamedLayerConfig {
    pub name: String,
    #[serde(flatten)]
    pub config: LayerConfig,
}

/// Configuration for an [`Animator`](crate::animator::Animator).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Playback speed multiplier; negative values are treated as zero.
    pub time_scale: f32,
    pub layers: Vec<NamedLayerConfig>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            layers: Vec::new(),
        }
    }
}
