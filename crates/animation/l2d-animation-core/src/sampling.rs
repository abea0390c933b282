//! Curve sampling.
//!
//! Model:
//! - A curve is an ordered point list plus contiguous segments, each tagged with
//!   an interpolation kernel.
//! - The active segment is the first one whose end point is at or after `time`;
//!   the last segment absorbs anything beyond the curve's end.
//! - No clamping is applied. Callers pass clip-local time, already loop-folded.
//!
//! API:
//! - sample_curve(&Curve, time) / Curve::evaluate(time)

use crate::data::{Curve, Segment};

/// Index of the segment that covers `time`.
///
/// Returns the smallest `s` such that `s` is the last segment, or the first
/// point of segment `s + 1` is at or after `time`. Linear scan: motion curves
/// carry few segments.
fn find_segment(curve: &Curve, time: f32) -> Option<usize> {
    let segments = &curve.segments;
    if segments.is_empty() {
        return None;
    }
    let last = segments.len() - 1;
    for s in 0..last {
        let next: &Segment = &segments[s + 1];
        match curve.points.get(next.point_offset) {
            Some(p) if p.time >= time => return Some(s),
            Some(_) => {}
            None => return Some(s),
        }
    }
    Some(last)
}

/// Sample a curve at clip-local `time` (seconds).
pub fn sample_curve(curve: &Curve, time: f32) -> f32 {
    match find_segment(curve, time) {
        Some(s) => {
            let seg = curve.segments[s];
            seg.kernel.evaluate(&curve.points, seg.point_offset, time)
        }
        // No segments: a lone keyframe holds its value; an empty curve is neutral.
        None => curve.points.first().map(|p| p.value).unwrap_or(0.0),
    }
}

impl Curve {
    #[inline]
    pub fn evaluate(&self, time: f32) -> f32 {
        sample_curve(self, time)
    }
}
