//! Persistence and identity collaborators.
//!
//! DESIGN
//! ======
//! The session talks to storage only through these object-safe async traits,
//! shared as `Arc<dyn …>`. The engine assigns ids, timestamps and geometry
//! before a record reaches a repo, so `create` stores what it is given and
//! returns the id. Reads return records in creation order; that order is the
//! canvas z-order.

use async_trait::async_trait;
use canvas::{Connection, ConnectionId, Note, NoteColor, NoteId, NotePatch};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryConnectionRepo, MemoryNoteRepo};
pub use postgres::{PgConnectionRepo, PgNoteRepo};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("record not found: {0}")]
    NotFound(Uuid),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepoError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Unavailable(_) => "E_UNAVAILABLE",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

/// Partial note write. `updated_at` is always stamped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<NoteColor>,
    pub tags: Option<Vec<String>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub updated_at: i64,
}

impl NoteUpdate {
    /// Position-only write, as produced by the end of a drag.
    #[must_use]
    pub fn position(x: f64, y: f64, updated_at: i64) -> Self {
        Self { x: Some(x), y: Some(y), updated_at, ..Self::default() }
    }

    /// Text/color/tags write from an edit.
    #[must_use]
    pub fn from_patch(patch: NotePatch, updated_at: i64) -> Self {
        Self {
            title: patch.title,
            content: patch.content,
            color: patch.color,
            tags: patch.tags,
            x: None,
            y: None,
            updated_at,
        }
    }

    /// Apply this write to a stored note.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
        if let Some(color) = self.color {
            note.color = color;
        }
        if let Some(tags) = &self.tags {
            note.tags.clone_from(tags);
        }
        if let Some(x) = self.x {
            note.x = x;
        }
        if let Some(y) = self.y {
            note.y = y;
        }
        note.updated_at = self.updated_at;
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// Durable note storage.
#[async_trait]
pub trait NoteRepo: Send + Sync {
    /// All notes in creation order.
    async fn get_all(&self) -> Result<Vec<Note>, RepoError>;

    async fn get_by_id(&self, id: NoteId) -> Result<Option<Note>, RepoError>;

    /// Store a fully stamped note and return its id.
    async fn create(&self, note: &Note) -> Result<NoteId, RepoError>;

    /// # Errors
    ///
    /// Returns `NotFound` if no note has this id.
    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<(), RepoError>;

    /// Deleting a missing note is not an error.
    async fn delete(&self, id: NoteId) -> Result<(), RepoError>;
}

/// Durable connection storage.
#[async_trait]
pub trait ConnectionRepo: Send + Sync {
    /// All connections in creation order.
    async fn get_all(&self) -> Result<Vec<Connection>, RepoError>;

    async fn create(&self, connection: &Connection) -> Result<ConnectionId, RepoError>;

    /// Deleting a missing connection is not an error.
    async fn delete(&self, id: ConnectionId) -> Result<(), RepoError>;

    /// Remove every connection touching `note_id`. Returns how many went.
    async fn delete_by_note_id(&self, note_id: NoteId) -> Result<u64, RepoError>;
}

/// Supplies the signed-in user, stamped onto new notes.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn current_user_id(&self) -> Option<String>;
}

/// Identity fixed at construction; `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<String>);

impl StaticIdentity {
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl Identity for StaticIdentity {
    async fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
