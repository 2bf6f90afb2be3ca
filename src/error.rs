use std::fmt;

use thiserror::Error;

use crate::id_generator::ObjectId;
use crate::persistence::PersistenceError;
use crate::renderer::RenderError;

/// Errors that can occur during tool state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Attempted to transition between incompatible states
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
    },
    /// Tool is busy and cannot accept the event
    ToolBusy(String),
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to } =>
                write!(f, "Cannot transition from {} to {}", from, to),
            Self::ToolBusy(reason) =>
                write!(f, "Tool busy: {}", reason),
        }
    }
}

impl std::error::Error for TransitionError {}

/// Errors reported by the editing session
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid canvas dimension {width}x{height}: both sides must be positive")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Failed to decode image asset: {0}")]
    AssetDecodeFailure(String),

    #[error("A history restore is still in flight")]
    RestoreInFlight,

    #[error("No object with id {0}")]
    UnknownObject(ObjectId),

    #[error("Object id {0} is already present in the scene")]
    DuplicateObject(ObjectId),

    #[error("Invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("Unknown canvas preset: {0}")]
    UnknownPreset(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type for session operations
pub type EditorResult<T> = Result<T, EditorError>;
