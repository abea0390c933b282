use serde::Deserialize;

use crate::data::{AnimationData, AnimationPoint, Curve, Segment, UserDataEvent};
use crate::error::{AnimationError, Result};
use crate::interp::InterpolationKernel;

/// Public API: parse a motion3 JSON document into the canonical
/// [`AnimationData`] (data.rs).
///
/// Notes:
/// - `Meta` and `Curves` are required; anything unreadable fails as a single
///   `MalformedAnimationData` and no partial clip is produced.
/// - `Segments` is the flat motion3 encoding: the first point `(t, v)`, then
///   repeated groups of `(code, ...)`. Code 1 (bezier) carries three points,
///   every other code one. Unknown codes are read as linear.
/// - Curves with an unrecognized `Target` are skipped.
pub fn parse_motion_json(s: &str) -> Result<AnimationData> {
    let doc: MotionDocument = serde_json::from_str(s)
        .map_err(|e| AnimationError::malformed(format!("motion3 parse error: {e}")))?;

    let meta = doc.meta;
    let mut data = AnimationData::new(meta.duration, meta.fps, meta.looping);
    data.fade_in_time = meta.fade_in_time;
    data.fade_out_time = meta.fade_out_time;

    for raw in doc.curves {
        let curve = decode_curve(raw.id, &raw.segments)?;
        match raw.target {
            RawTarget::Model => data.model_curves.push(curve),
            RawTarget::Parameter => data.parameter_curves.push(curve),
            RawTarget::PartOpacity => data.part_opacity_curves.push(curve),
            RawTarget::Unknown => {
                log::debug!("skipping curve '{}' with unknown target", curve.target_id);
            }
        }
    }

    data.user_events = doc
        .user_data
        .unwrap_or_default()
        .into_iter()
        .map(|u| UserDataEvent {
            time: u.time,
            value: u.value,
        })
        .collect();

    if let Some(expected) = meta.user_data_count {
        if expected as usize != data.user_events.len() {
            log::debug!(
                "Meta.UserDataCount is {expected} but {} events were read",
                data.user_events.len()
            );
        }
    }

    data.validate_basic().map_err(AnimationError::malformed)?;
    log::debug!(
        "parsed motion: duration={}s loop={} curves={} events={}",
        data.duration,
        data.looping,
        data.curve_count(),
        data.user_events.len()
    );
    Ok(data)
}

/// Decode one flat `Segments` array into points and segments.
fn decode_curve(id: String, raw: &[f32]) -> Result<Curve> {
    if raw.len() < 2 {
        return Err(AnimationError::malformed(format!(
            "curve '{id}' needs at least one point in Segments"
        )));
    }
    let mut points = vec![AnimationPoint::new(raw[0], raw[1])];
    let mut segments = Vec::new();
    let mut cursor = 2;

    while cursor < raw.len() {
        let code = raw[cursor] as i64;
        let kernel = InterpolationKernel::from_code(code).unwrap_or_else(|| {
            log::debug!("curve '{id}': unknown segment type {code}; using linear");
            InterpolationKernel::Linear
        });
        let span = kernel.point_span();
        let end = cursor + 1 + span * 2;
        if end > raw.len() {
            return Err(AnimationError::malformed(format!(
                "curve '{id}' has a truncated segment at index {cursor}"
            )));
        }
        segments.push(Segment {
            point_offset: points.len() - 1,
            kernel,
        });
        for pair in raw[cursor + 1..end].chunks_exact(2) {
            points.push(AnimationPoint::new(pair[0], pair[1]));
        }
        cursor = end;
    }

    Ok(Curve {
        target_id: id,
        points,
        segments,
    })
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MotionDocument {
    meta: MotionMeta,
    #[serde(default)]
    user_data: Option<Vec<RawUserData>>,
    curves: Vec<RawCurve>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MotionMeta {
    duration: f32,
    #[serde(default = "default_fps")]
    fps: f32,
    #[serde(rename = "Loop", default)]
    looping: bool,
    #[serde(default)]
    user_data_count: Option<u32>,
    #[serde(default)]
    fade_in_time: Option<f32>,
    #[serde(default)]
    fade_out_time: Option<f32>,
}

fn default_fps() -> f32 {
    30.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawUserData {
    time: f32,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCurve {
    target: RawTarget,
    id: String,
    segments: Vec<f32>,
}

#[derive(Debug, Deserialize)]
enum RawTarget {
    Model,
    Parameter,
    PartOpacity,
    #[serde(other)]
    Unknown,
}
