//! Canvas session: engine plus persistence.
//!
//! DESIGN
//! ======
//! Every UI entry point runs the engine first, so local state changes
//! immediately. The returned actions go through `apply`, which awaits each
//! mutating write in order. When at least one write landed and none failed,
//! a full reload from the repos overwrites local state. Two sessions over
//! the same store therefore converge on whichever wrote last.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is reported in the `Outcome`, the rest of the batch is
//! skipped, and the reload is skipped too. Local state stays ahead of the
//! store until the next successful reload discards the change.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use canvas::{
    Action, Button, CanvasError, ConnectionId, EngineConfig, EngineCore, Key, Modifiers, NoteId, NoteInput, NotePatch,
    Point, WheelDelta,
};
use tracing::{debug, info, warn};

use crate::repo::{ConnectionRepo, Identity, NoteRepo, NoteUpdate, RepoError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("persistence failed ({op}): {source}")]
    Persistence {
        op: &'static str,
        #[source]
        source: RepoError,
    },
}

impl SessionError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Canvas(e) => e.error_code(),
            Self::Persistence { .. } => "E_PERSISTENCE",
        }
    }
}

/// What happened to one batch of engine actions.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Non-mutating actions for the UI: cursors, redraws, warnings, prompts.
    pub actions: Vec<Action>,
    /// Number of mutating actions written to the store.
    pub persisted: usize,
    pub errors: Vec<SessionError>,
    /// Whether local state was overwritten from the store afterwards.
    pub reloaded: bool,
}

impl Outcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn persistence(op: &'static str) -> impl FnOnce(RepoError) -> SessionError {
    move |source| SessionError::Persistence { op, source }
}

/// Source of `created_at` / `updated_at` stamps, in epoch milliseconds.
pub type Clock = fn() -> i64;

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

pub struct CanvasSession {
    engine: EngineCore,
    notes: Arc<dyn NoteRepo>,
    connections: Arc<dyn ConnectionRepo>,
    identity: Arc<dyn Identity>,
    clock: Clock,
}

// =============================================================================
// LIFECYCLE
// =============================================================================

impl CanvasSession {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        notes: Arc<dyn NoteRepo>,
        connections: Arc<dyn ConnectionRepo>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        Self { engine: EngineCore::with_config(config), notes, connections, identity, clock: now_ms }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// Reset the viewport, pick up the current user, and load the store.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if either snapshot can't be read.
    pub async fn open(&mut self) -> Result<(), SessionError> {
        self.engine.reset_view();
        let owner = self.identity.current_user_id().await;
        debug!(owner = ?owner, "opening canvas");
        self.engine.set_owner(owner);
        self.reload().await
    }

    /// Overwrite local notes and connections with the store's contents.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if either snapshot can't be read; local state is
    /// left as it was.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        let notes = self
            .notes
            .get_all()
            .await
            .map_err(|source| SessionError::Persistence { op: "load notes", source })?;
        let connections = self
            .connections
            .get_all()
            .await
            .map_err(|source| SessionError::Persistence { op: "load connections", source })?;
        info!(notes = notes.len(), connections = connections.len(), "canvas reloaded");
        self.engine.load_snapshot(notes, connections);
        Ok(())
    }

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    /// Persist the mutating actions in order, then reload if all of them landed.
    pub async fn apply(&mut self, actions: Vec<Action>) -> Outcome {
        let mut outcome = Outcome::default();
        let mut failed = false;

        for action in actions {
            if !action.is_mutation() {
                outcome.actions.push(action);
                continue;
            }
            if failed {
                debug!(?action, "skipping write after earlier failure");
                continue;
            }
            match self.persist(&action).await {
                Ok(()) => outcome.persisted += 1,
                Err(e) => {
                    warn!(error = %e, "write failed; local state is ahead of the store");
                    outcome.errors.push(e);
                    failed = true;
                }
            }
        }

        if outcome.persisted > 0 && !failed {
            match self.reload().await {
                Ok(()) => outcome.reloaded = true,
                Err(e) => {
                    warn!(error = %e, "reload after write failed");
                    outcome.errors.push(e);
                }
            }
        }
        outcome
    }

    async fn persist(&self, action: &Action) -> Result<(), SessionError> {
        match action {
            Action::NoteCreated(note) => {
                self.notes.create(note).await.map_err(persistence("create note"))?;
            }
            Action::NoteMoved { id, x, y } => {
                let update = NoteUpdate::position(*x, *y, (self.clock)());
                self.notes.update(*id, update).await.map_err(persistence("move note"))?;
            }
            Action::NoteUpdated { id, patch, updated_at } => {
                let update = NoteUpdate::from_patch(patch.clone(), *updated_at);
                self.notes.update(*id, update).await.map_err(persistence("update note"))?;
            }
            Action::NoteDeleted { id } => {
                let removed = self
                    .connections
                    .delete_by_note_id(*id)
                    .await
                    .map_err(persistence("delete note connections"))?;
                self.notes.delete(*id).await.map_err(persistence("delete note"))?;
                debug!(%id, connections = removed, "note deleted from store");
            }
            Action::ConnectionCreated(connection) => {
                self.connections.create(connection).await.map_err(persistence("create connection"))?;
            }
            Action::ConnectionDeleted { id } => {
                self.connections.delete(*id).await.map_err(persistence("delete connection"))?;
            }
            Action::ConfirmDeleteConnection { .. } | Action::Warning(_) | Action::SetCursor(_) | Action::RenderNeeded => {}
        }
        Ok(())
    }

    // =========================================================================
    // UI ENTRY POINTS
    // =========================================================================

    pub async fn pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Outcome {
        let actions = self.engine.on_pointer_down(screen_pt, button, modifiers);
        self.apply(actions).await
    }

    pub async fn pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Outcome {
        let actions = self.engine.on_pointer_move(screen_pt, modifiers);
        self.apply(actions).await
    }

    pub async fn pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Outcome {
        let actions = self.engine.on_pointer_up(screen_pt, button, modifiers);
        self.apply(actions).await
    }

    pub async fn pointer_leave(&mut self, screen_pt: Point) -> Outcome {
        let actions = self.engine.on_pointer_leave(screen_pt);
        self.apply(actions).await
    }

    pub async fn wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Outcome {
        let actions = self.engine.on_wheel(screen_pt, delta, modifiers);
        self.apply(actions).await
    }

    pub async fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Outcome {
        let actions = self.engine.on_key_down(key, modifiers);
        self.apply(actions).await
    }

    pub async fn zoom_in(&mut self) -> Outcome {
        let actions = self.engine.zoom_in();
        self.apply(actions).await
    }

    pub async fn zoom_out(&mut self) -> Outcome {
        let actions = self.engine.zoom_out();
        self.apply(actions).await
    }

    pub async fn reset_zoom(&mut self) -> Outcome {
        let actions = self.engine.reset_zoom();
        self.apply(actions).await
    }

    pub async fn toggle_connect_mode(&mut self) -> Outcome {
        let actions = self.engine.toggle_connect_mode();
        self.apply(actions).await
    }

    /// # Errors
    ///
    /// Returns `Canvas` on validation failure; nothing is written.
    pub async fn create_note(&mut self, input: NoteInput) -> Result<Outcome, SessionError> {
        let actions = self.engine.create_note(input, (self.clock)())?;
        Ok(self.apply(actions).await)
    }

    /// # Errors
    ///
    /// Returns `Canvas` for an unknown note or a failed validation.
    pub async fn update_note(&mut self, id: NoteId, patch: NotePatch) -> Result<Outcome, SessionError> {
        let actions = self.engine.update_note(&id, patch, (self.clock)())?;
        Ok(self.apply(actions).await)
    }

    /// # Errors
    ///
    /// Returns `Canvas` for an unknown note.
    pub async fn delete_note(&mut self, id: NoteId) -> Result<Outcome, SessionError> {
        let actions = self.engine.delete_note(&id)?;
        Ok(self.apply(actions).await)
    }

    /// Call after the user accepted a `ConfirmDeleteConnection` prompt.
    ///
    /// # Errors
    ///
    /// Returns `Canvas` if the connection is already gone locally.
    pub async fn confirm_delete_connection(&mut self, id: ConnectionId) -> Result<Outcome, SessionError> {
        let actions = self.engine.confirm_delete_connection(&id)?;
        Ok(self.apply(actions).await)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
