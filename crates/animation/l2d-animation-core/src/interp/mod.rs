//! Interpolation kernels.
//!
//! Four kernels cover every motion3 segment type. Dispatch is a closed enum so
//! the sampler stays exhaustive.

pub mod functions;

use serde::{Deserialize, Serialize};

use crate::data::AnimationPoint;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InterpolationKernel {
    #[default]
    Linear,
    Bezier,
    Stepped,
    InverseStepped,
}

impl InterpolationKernel {
    /// Map a motion3 segment type code. Unknown codes return `None`; the parser
    /// falls back to linear for those.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(InterpolationKernel::Linear),
            1 => Some(InterpolationKernel::Bezier),
            2 => Some(InterpolationKernel::Stepped),
            3 => Some(InterpolationKernel::InverseStepped),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            InterpolationKernel::Linear => 0,
            InterpolationKernel::Bezier => 1,
            InterpolationKernel::Stepped => 2,
            InterpolationKernel::InverseStepped => 3,
        }
    }

    /// Number of points a segment adds after its starting point.
    #[inline]
    pub fn point_span(self) -> usize {
        match self {
            InterpolationKernel::Bezier => 3,
            _ => 1,
        }
    }

    /// Evaluate the segment starting at `points[offset]` at `time`.
    #[inline]
    pub fn evaluate(self, points: &[AnimationPoint], offset: usize, time: f32) -> f32 {
        match self {
            InterpolationKernel::Linear => functions::linear(points, offset, time),
            InterpolationKernel::Bezier => functions::bezier(points, offset, time),
            InterpolationKernel::Stepped => functions::stepped(points, offset, time),
            InterpolationKernel::InverseStepped => {
                functions::inverse_stepped(points, offset, time)
            }
        }
    }
}
