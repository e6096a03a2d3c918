//! Engine error taxonomy.
//!
//! None of these are fatal. Validation errors are returned before any state
//! changes; edge errors are surfaced to the user as warnings while the
//! interaction state machine still returns to `Idle` where it would have.

use crate::doc::NoteId;
use crate::graph::ConnectionId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("validation failed: invalid {field}")]
    Validation { field: &'static str },
    #[error("a note cannot be connected to itself: {0}")]
    SelfEdge(NoteId),
    #[error("notes {a} and {b} are already connected")]
    DuplicateEdge { a: NoteId, b: NoteId },
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),
}

impl CanvasError {
    /// Stable machine-readable code for host UIs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E_VALIDATION",
            Self::SelfEdge(_) => "E_SELF_EDGE",
            Self::DuplicateEdge { .. } => "E_DUPLICATE_EDGE",
            Self::NoteNotFound(_) => "E_NOTE_NOT_FOUND",
            Self::ConnectionNotFound(_) => "E_CONNECTION_NOT_FOUND",
        }
    }

    /// Whether this error is a warning about an edge the user tried to draw.
    #[must_use]
    pub fn is_edge_warning(&self) -> bool {
        matches!(self, Self::SelfEdge(_) | Self::DuplicateEdge { .. })
    }
}
