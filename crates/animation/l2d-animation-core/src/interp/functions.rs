//! Interpolation helpers:
//! - linear (two points)
//! - bezier (four control points, De Casteljau over (time, value))
//! - stepped / inverse_stepped (hold left / hold right)
//!
//! Segment offsets come from a validated curve; out-of-range points fall back
//! to the last available point rather than panicking.

use crate::data::AnimationPoint;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_point(a: AnimationPoint, b: AnimationPoint, t: f32) -> AnimationPoint {
    AnimationPoint {
        time: lerp_f32(a.time, b.time, t),
        value: lerp_f32(a.value, b.value, t),
    }
}

#[inline]
fn point_at(points: &[AnimationPoint], index: usize) -> AnimationPoint {
    points
        .get(index)
        .or_else(|| points.last())
        .copied()
        .unwrap_or(AnimationPoint {
            time: 0.0,
            value: 0.0,
        })
}

/// Normalized position of `time` between `start` and `end`. A zero-length span
/// maps to 0.
#[inline]
fn segment_t(start: f32, end: f32, time: f32) -> f32 {
    let span = end - start;
    if span == 0.0 {
        0.0
    } else {
        (time - start) / span
    }
}

pub fn linear(points: &[AnimationPoint], offset: usize, time: f32) -> f32 {
    let p0 = point_at(points, offset);
    let p1 = point_at(points, offset + 1);
    let t = segment_t(p0.time, p1.time, time);
    lerp_f32(p0.value, p1.value, t)
}

pub fn bezier(points: &[AnimationPoint], offset: usize, time: f32) -> f32 {
    let p0 = point_at(points, offset);
    let p1 = point_at(points, offset + 1);
    let p2 = point_at(points, offset + 2);
    let p3 = point_at(points, offset + 3);
    let t = segment_t(p0.time, p3.time, time);

    let p01 = lerp_point(p0, p1, t);
    let p12 = lerp_point(p1, p2, t);
    let p23 = lerp_point(p2, p3, t);

    let p012 = lerp_point(p01, p12, t);
    let p123 = lerp_point(p12, p23, t);

    lerp_point(p012, p123, t).value
}

pub fn stepped(points: &[AnimationPoint], offset: usize, _time: f32) -> f32 {
    point_at(points, offset).value
}

pub fn inverse_stepped(points: &[AnimationPoint], offset: usize, _time: f32) -> f32 {
    point_at(points, offset + 1).value
}
