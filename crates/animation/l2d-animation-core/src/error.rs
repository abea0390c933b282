//! Error type shared by the motion parser and the animator API.

use thiserror::Error;

use crate::ids::AnimId;

/// Errors surfaced by `l2d-animation-core`.
///
/// Evaluation itself never fails: unknown curve ids, unknown segment codes and
/// idle layers are tolerated silently. Errors only come from loading documents
/// and from addressing layers/clips that were never registered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnimationError {
    #[error("malformed animation data: {0}")]
    MalformedAnimationData(String),
    #[error("malformed model settings: {0}")]
    MalformedModelSettings(String),
    #[error("unknown layer '{0}'")]
    UnknownLayer(String),
    #[error("layer '{0}' is already registered")]
    DuplicateLayer(String),
    #[error("unknown animation {0:?}")]
    UnknownAnimation(AnimId),
}

impl AnimationError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        AnimationError::MalformedAnimationData(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnimationError>;
