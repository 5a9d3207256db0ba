//! Selection and drag state for the marker board

use crate::domain::{MarkerId, Point};

/// Which marker, if any, has its comment open for editing
///
/// The marker is held by id only; the board owns the marker itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    Idle,
    Editing {
        marker: MarkerId,
        /// Comment text typed so far, committed on confirm or dismiss
        pending: String,
    },
}

impl Selection {
    /// Id of the marker being edited
    pub fn active(&self) -> Option<MarkerId> {
        match self {
            Selection::Idle => None,
            Selection::Editing { marker, .. } => Some(*marker),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Selection::Editing { .. })
    }

    /// Comment text not yet committed to the active marker
    pub fn pending(&self) -> Option<&str> {
        match self {
            Selection::Idle => None,
            Selection::Editing { pending, .. } => Some(pending),
        }
    }
}

/// How a pressed marker follows the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    /// Translate by pointer deltas since `last`
    Move { last: Point },
    /// Radius tracks the pointer's distance from the center
    Resize,
}

/// A marker grabbed by the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub marker: MarkerId,
    pub mode: DragMode,
}
