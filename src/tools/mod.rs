use egui::Pos2;

use crate::error::TransitionError;
use crate::id_generator::ObjectId;

mod gradient_line_tool;
pub use gradient_line_tool::GradientLineTool;

/// Interaction state of a pointer-driven drawing tool
#[derive(Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Tool not selected; the canvas behaves normally
    #[default]
    Idle,
    /// Tool selected, waiting for a pointer press
    Armed,
    /// A line is being stretched from `anchor` to the pointer
    Dragging {
        line: ObjectId,
        anchor: Pos2,
    },
}

// Manual Debug so log lines stay short
impl std::fmt::Debug for ToolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Armed => write!(f, "Armed"),
            Self::Dragging { line, anchor } => f
                .debug_struct("Dragging")
                .field("line", line)
                .field("anchor", anchor)
                .finish(),
        }
    }
}

impl ToolState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Armed => "Armed",
            Self::Dragging { .. } => "Dragging",
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The line currently being stretched, if any
    pub fn in_progress(&self) -> Option<ObjectId> {
        match self {
            Self::Dragging { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Transition table of the drawing tool
    pub fn can_transition_to(&self, next: &ToolState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Armed)
                | (Self::Armed, Self::Dragging { .. })
                | (Self::Dragging { .. }, Self::Dragging { .. })
                | (Self::Dragging { .. }, Self::Armed)
                | (Self::Armed, Self::Idle)
                | (Self::Dragging { .. }, Self::Idle)
        )
    }

    /// Move to `next` if the table allows it
    pub fn transition(&mut self, next: ToolState) -> Result<(), TransitionError> {
        if !self.can_transition_to(&next) {
            return Err(TransitionError::InvalidStateTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        *self = next;
        Ok(())
    }
}
