//! L2D Animation Core (engine-agnostic)
//!
//! Motion evaluation for Live2D rigs: keyframe curves with linear, bezier,
//! stepped and inverse-stepped segments; clips that blend into a model's
//! parameter and part-opacity arrays; layers that crossfade between clips; and
//! an animator that drives its layers once per frame. The model itself is an
//! external collaborator reached through [`ModelRuntime`].

pub mod animation;
pub mod animator;
pub mod blend;
pub mod config;
pub mod data;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod layer;
pub mod model;
pub mod motion_json;
pub mod sampling;
pub mod scratch;

// Re-exports for consumers (adapters)
pub use animation::{is_event_triggered, Animation, AnimationLibrary, EvalTarget};
pub use animator::{Animator, AnimatorBuilder};
pub use blend::{BlendMode, CrossfadeCurve};
pub use config::{AnimatorConfig, NamedLayerConfig};
pub use data::{AnimationData, AnimationPoint, Curve, CurveTarget, Segment, UserDataEvent};
pub use error::{AnimationError, Result};
pub use ids::AnimId;
pub use inputs::AnimatorCommand;
pub use interp::InterpolationKernel;
pub use layer::{AnimationLayer, LayerConfig, LayerState};
pub use model::{
    GroupTarget, ModelBinding, ModelDesc, ModelRuntime, ModelState, ParameterGroup,
    ParameterGroups,
};
pub use motion_json::parse_motion_json;
pub use sampling::sample_curve;
pub use scratch::TouchedFlags;
