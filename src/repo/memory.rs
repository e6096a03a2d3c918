//! In-process repos backed by `tokio::sync::RwLock`.
//!
//! Clones share storage, so several sessions over the same repo pair see
//! each other's writes exactly as they would against a real database. Both
//! repos carry a failure switch: while it is on, every write returns
//! `RepoError::Unavailable` and nothing is stored. Reads keep working.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use canvas::{Connection, ConnectionId, Note, NoteId};
use tokio::sync::RwLock;
use tracing::debug;

use super::{ConnectionRepo, NoteRepo, NoteUpdate, RepoError};

#[derive(Clone, Default)]
pub struct MemoryNoteRepo {
    notes: Arc<RwLock<Vec<Note>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryNoteRepo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("note store rejected write".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl NoteRepo for MemoryNoteRepo {
    async fn get_all(&self) -> Result<Vec<Note>, RepoError> {
        Ok(self.notes.read().await.clone())
    }

    async fn get_by_id(&self, id: NoteId) -> Result<Option<Note>, RepoError> {
        Ok(self.notes.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn create(&self, note: &Note) -> Result<NoteId, RepoError> {
        self.check_writable()?;
        let mut notes = self.notes.write().await;
        if let Some(existing) = notes.iter_mut().find(|n| n.id == note.id) {
            *existing = note.clone();
        } else {
            notes.push(note.clone());
        }
        debug!(id = %note.id, "memory note stored");
        Ok(note.id)
    }

    async fn update(&self, id: NoteId, update: NoteUpdate) -> Result<(), RepoError> {
        self.check_writable()?;
        let mut notes = self.notes.write().await;
        let note = notes.iter_mut().find(|n| n.id == id).ok_or(RepoError::NotFound(id))?;
        update.apply_to(note);
        Ok(())
    }

    async fn delete(&self, id: NoteId) -> Result<(), RepoError> {
        self.check_writable()?;
        self.notes.write().await.retain(|n| n.id != id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryConnectionRepo {
    connections: Arc<RwLock<Vec<Connection>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryConnectionRepo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("connection store rejected write".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionRepo for MemoryConnectionRepo {
    async fn get_all(&self) -> Result<Vec<Connection>, RepoError> {
        Ok(self.connections.read().await.clone())
    }

    async fn create(&self, connection: &Connection) -> Result<ConnectionId, RepoError> {
        self.check_writable()?;
        let mut connections = self.connections.write().await;
        if !connections.iter().any(|c| c.id == connection.id) {
            connections.push(connection.clone());
        }
        Ok(connection.id)
    }

    async fn delete(&self, id: ConnectionId) -> Result<(), RepoError> {
        self.check_writable()?;
        self.connections.write().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_by_note_id(&self, note_id: NoteId) -> Result<u64, RepoError> {
        self.check_writable()?;
        let mut connections = self.connections.write().await;
        let before = connections.len();
        connections.retain(|c| !c.touches(&note_id));
        Ok(u64::try_from(before - connections.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
