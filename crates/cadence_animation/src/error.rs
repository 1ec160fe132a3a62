use thiserror::Error;

use crate::animation::AnimationId;

/// Rejected group structure operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("no animation with id {0:?}")]
    UnknownAnimation(AnimationId),

    #[error("animation {0:?} is not a group")]
    NotAGroup(AnimationId),

    #[error("index {index} out of bounds for group of {len} animations")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("cannot insert at {index}: the group is already past animation {current}")]
    InsertBeforeCurrent { index: usize, current: usize },

    #[error("adding {child:?} to {group:?} would make a group contain itself")]
    CyclicGroup {
        group: AnimationId,
        child: AnimationId,
    },

    #[error("{child:?} is not a child of {group:?}")]
    NotAChild {
        group: AnimationId,
        child: AnimationId,
    },
}

/// Scheduler configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("timer interval must be at least 1 ms")]
    InvalidInterval,
}

pub type Result<T, E = AnimationError> = std::result::Result<T, E>;
