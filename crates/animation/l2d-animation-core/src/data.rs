//! Canonical motion clip data model.
//!
//! `AnimationData` is the typed, validated form of a motion3 document (see
//! `motion_json.rs`). It is immutable once built; mutable playback state lives
//! in [`Animation`](crate::animation::Animation).

use serde::{Deserialize, Serialize};

use crate::interp::InterpolationKernel;

/// A single keyframe: `value` at clip-local `time` (seconds).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationPoint {
    pub time: f32,
    pub value: f32,
}

impl AnimationPoint {
    #[inline]
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// One interpolated span of a curve.
///
/// Spans points `[point_offset, point_offset + kernel.point_span()]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub point_offset: usize,
    pub kernel: InterpolationKernel,
}

/// What a curve animates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurveTarget {
    /// Resolved through parameter groups (e.g. "EyeBlink", "LipSync").
    Model,
    Parameter,
    PartOpacity,
}

/// A named keyframe track with per-segment interpolation kernels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Curve {
    /// Parameter id, part id, or group name depending on the owning list.
    pub target_id: String,
    pub points: Vec<AnimationPoint>,
    pub segments: Vec<Segment>,
}

impl Curve {
    /// Convenience constructor for a curve whose segments all use `kernel`.
    /// Bezier segments consume three points after their start; trailing points
    /// that do not complete a segment are kept but never sampled.
    pub fn from_points(
        target_id: impl Into<String>,
        points: Vec<AnimationPoint>,
        kernel: InterpolationKernel,
    ) -> Self {
        let step = kernel.point_span();
        let segments = if points.len() > step {
            (0..points.len() - step)
                .step_by(step)
                .map(|point_offset| Segment {
                    point_offset,
                    kernel,
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            target_id: target_id.into(),
            points,
            segments,
        }
    }

    /// Time of the first and last keyframe, if any.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => Some((a.time, b.time)),
            _ => None,
        }
    }
}

/// A timestamped user-data event (payload is an opaque string).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDataEvent {
    pub time: f32,
    pub value: String,
}

/// Typed motion clip.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationData {
    /// Clip length in seconds.
    pub duration: f32,
    pub fps: f32,
    pub looping: bool,
    /// Authored fade-in time (seconds), when the document provides one.
    #[serde(default)]
    pub fade_in_time: Option<f32>,
    #[serde(default)]
    pub fade_out_time: Option<f32>,
    #[serde(default)]
    pub model_curves: Vec<Curve>,
    #[serde(default)]
    pub parameter_curves: Vec<Curve>,
    #[serde(default)]
    pub part_opacity_curves: Vec<Curve>,
    #[serde(default)]
    pub user_events: Vec<UserDataEvent>,
}

impl AnimationData {
    /// Empty clip with the given timing.
    pub fn new(duration: f32, fps: f32, looping: bool) -> Self {
        Self {
            duration,
            fps,
            looping,
            ..Self::default()
        }
    }

    /// Curves for a target kind.
    pub fn curves(&self, target: CurveTarget) -> &[Curve] {
        match target {
            CurveTarget::Model => &self.model_curves,
            CurveTarget::Parameter => &self.parameter_curves,
            CurveTarget::PartOpacity => &self.part_opacity_curves,
        }
    }

    pub fn curve_count(&self) -> usize {
        self.model_curves.len() + self.parameter_curves.len() + self.part_opacity_curves.len()
    }

    /// Validate basic invariants (finite non-negative duration, finite points,
    /// segment keyframes ordered by time, segments inside the point list).
    pub fn validate_basic(&self) -> Result<(), String> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(format!(
                "Meta.Duration must be finite and >= 0 (got {})",
                self.duration
            ));
        }
        let all = self
            .model_curves
            .iter()
            .chain(&self.parameter_curves)
            .chain(&self.part_opacity_curves);
        for curve in all {
            if curve
                .points
                .iter()
                .any(|p| !p.time.is_finite() || !p.value.is_finite())
            {
                return Err(format!(
                    "curve '{}' contains a non-finite point",
                    curve.target_id
                ));
            }
            // Only segment endpoints are keyframes; bezier handles may sit
            // anywhere in time.
            let mut last = f32::NEG_INFINITY;
            for seg in &curve.segments {
                let end = seg.point_offset + seg.kernel.point_span();
                let (Some(start), Some(stop)) =
                    (curve.points.get(seg.point_offset), curve.points.get(end))
                else {
                    return Err(format!(
                        "curve '{}' has a segment past its last point",
                        curve.target_id
                    ));
                };
                if start.time < last || stop.time < start.time {
                    return Err(format!(
                        "curve '{}' keyframes must be ordered by time",
                        curve.target_id
                    ));
                }
                last = stop.time;
            }
        }
        Ok(())
    }
}
