//! Blend modes and crossfade weighting curves.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// How a sampled curve value is combined with the value already in the model.
///
/// Arguments follow one convention throughout: `source` is the current model
/// value, `destination` the sampled curve value, `initial` the curve's value at
/// time zero.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Override,
    Add,
    Multiply,
}

impl BlendMode {
    #[inline]
    pub fn apply(self, source: f32, destination: f32, initial: f32, weight: f32) -> f32 {
        match self {
            BlendMode::Override => override_blend(source, destination, initial, weight),
            BlendMode::Add => add_blend(source, destination, initial, weight),
            BlendMode::Multiply => multiply_blend(source, destination, weight),
        }
    }
}

#[inline]
pub fn override_blend(source: f32, destination: f32, _initial: f32, weight: f32) -> f32 {
    destination * weight + source * (1.0 - weight)
}

#[inline]
pub fn add_blend(source: f32, destination: f32, initial: f32, weight: f32) -> f32 {
    source + (destination - initial) * weight
}

/// Multiplicative blend. Takes no `initial`.
#[inline]
pub fn multiply_blend(source: f32, destination: f32, weight: f32) -> f32 {
    source * (1.0 + (destination - 1.0) * weight)
}

/// Weight of the outgoing animation as a function of fade progress.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CrossfadeCurve {
    /// `elapsed / duration`, unclamped.
    #[default]
    Linear,
    /// Sine ease-in-out over the clamped fade fraction.
    Sine,
}

impl CrossfadeCurve {
    #[inline]
    pub fn weight(self, elapsed: f32, duration: f32) -> f32 {
        match self {
            CrossfadeCurve::Linear => elapsed / duration,
            CrossfadeCurve::Sine => {
                let t = if duration > 0.0 {
                    (elapsed / duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                0.5 - 0.5 * (t * PI).cos()
            }
        }
    }
}
