//! Command contracts for driving an animator from serialized input.
//!
//! Adapters (web) decode these from host messages and pass them to
//! `Animator::apply_commands()` before ticking.

use serde::{Deserialize, Serialize};

use crate::ids::AnimId;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatorCommand {
    /// Play a clip on a layer. Without `fade_duration` the clip's own
    /// `FadeInTime` is used (zero when absent).
    Play {
        layer: String,
        animation: AnimId,
        #[serde(default)]
        fade_duration: Option<f32>,
    },
    Pause {
        layer: String,
    },
    Resume {
        layer: String,
    },
    Stop {
        layer: String,
    },
    SetLayerWeight {
        layer: String,
        weight: f32,
    },
    SetTimeScale {
        time_scale: f32,
    },
}
