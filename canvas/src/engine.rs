use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consts::{
    DEFAULT_NOTE_HEIGHT, DEFAULT_NOTE_WIDTH, EDGE_HIT_SLOP_PX, SPAWN_ORIGIN_PX, SPAWN_RANGE_X_PX, SPAWN_RANGE_Y_PX,
};
use crate::doc::{CanvasBounds, DocStore, Note, NoteDefaults, NoteId, NoteInput, NotePatch, normalize_tags};
use crate::error::CanvasError;
use crate::graph::{Connection, ConnectionGraph, ConnectionId};
use crate::hit::{self, Hit};
use crate::input::{Button, InteractionState, Key, Modifiers, WheelDelta, is_pan_gesture};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NoteCreated(Note),
    NoteMoved { id: NoteId, x: f64, y: f64 },
    NoteUpdated { id: NoteId, patch: NotePatch, updated_at: i64 },
    /// The note and every connection touching it are gone locally.
    NoteDeleted { id: NoteId },
    ConnectionCreated(Connection),
    ConnectionDeleted { id: ConnectionId },
    /// The user clicked a connection line; the host should ask before deleting it.
    ConfirmDeleteConnection { id: ConnectionId },
    Warning(CanvasError),
    SetCursor(String),
    RenderNeeded,
}

impl Action {
    /// Whether the host must write this action to the backing store.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::NoteCreated(_)
                | Self::NoteMoved { .. }
                | Self::NoteUpdated { .. }
                | Self::NoteDeleted { .. }
                | Self::ConnectionCreated(_)
                | Self::ConnectionDeleted { .. }
        )
    }
}

/// Tunables for the engine. Hosts usually build this from their own config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub bounds: CanvasBounds,
    pub note_width: f64,
    pub note_height: f64,
    /// Clickable half-width of a connection line, in screen pixels.
    pub edge_hit_slop_px: f64,
    /// Seed for the generator that scatters new notes.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bounds: CanvasBounds::default(),
            note_width: DEFAULT_NOTE_WIDTH,
            note_height: DEFAULT_NOTE_HEIGHT,
            edge_hit_slop_px: EDGE_HIT_SLOP_PX,
            seed: 0,
        }
    }
}

/// Core engine state: all logic that does not depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
/// Every field is private; the only way to change state is through the
/// operations below, each of which returns the `Action`s the host must act on.
pub struct EngineCore {
    doc: DocStore,
    graph: ConnectionGraph,
    camera: Camera,
    state: InteractionState,
    config: EngineConfig,
    owner_id: Option<String>,
    rng: SmallRng,
    viewport_width: f64,
    viewport_height: f64,
    dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            doc: DocStore::with_bounds(config.bounds),
            graph: ConnectionGraph::new(),
            camera: Camera::default(),
            state: InteractionState::Idle,
            config,
            owner_id: None,
            rng: SmallRng::seed_from_u64(config.seed),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    // --- Data inputs ---

    /// Replace local state with an authoritative snapshot.
    ///
    /// The viewport is left alone. Connections whose endpoints are missing are
    /// dropped, and a gesture that references a vanished note is abandoned.
    pub fn load_snapshot(&mut self, notes: Vec<Note>, connections: Vec<Connection>) {
        self.doc.load_snapshot(notes);
        self.graph.load_snapshot(connections);
        self.graph.prune_dangling(&self.doc);
        self.forget_missing_notes();
    }

    /// Reset the viewport and the interaction state, as on canvas open.
    pub fn reset_view(&mut self) {
        self.camera = Camera::default();
        self.state = InteractionState::Idle;
    }

    /// Set the identity stamped onto new notes.
    pub fn set_owner(&mut self, owner_id: Option<String>) {
        self.owner_id = owner_id;
    }

    /// Record the viewport size in CSS pixels and the device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    // --- Toolbar controls ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.camera.zoom_in();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.camera.zoom_out();
        vec![Action::RenderNeeded]
    }

    pub fn reset_zoom(&mut self) -> Vec<Action> {
        self.camera.reset_zoom();
        vec![Action::RenderNeeded]
    }

    /// Arm connect mode, or disarm it if it is already armed.
    ///
    /// An in-flight drag is committed first so its final position still
    /// reaches the backing store.
    pub fn toggle_connect_mode(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.state {
            InteractionState::ConnectSelecting { .. } => {
                self.transition(InteractionState::Idle);
                actions.push(Action::SetCursor("default".into()));
            }
            InteractionState::Dragging { .. } => {
                actions.extend(self.end_gesture());
                self.transition(InteractionState::ConnectSelecting { from: None });
                actions.push(Action::SetCursor("crosshair".into()));
            }
            InteractionState::Idle | InteractionState::Panning { .. } => {
                self.transition(InteractionState::ConnectSelecting { from: None });
                actions.push(Action::SetCursor("crosshair".into()));
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Create a note. Missing geometry is filled in with the default size and a
    /// scattered position inside the visible area.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank title/content or a non-positive size.
    pub fn create_note(&mut self, input: NoteInput, now: i64) -> Result<Vec<Action>, CanvasError> {
        let spawn = Point::new(
            SPAWN_ORIGIN_PX + self.rng.random::<f64>() * SPAWN_RANGE_X_PX,
            SPAWN_ORIGIN_PX + self.rng.random::<f64>() * SPAWN_RANGE_Y_PX,
        );
        let defaults = NoteDefaults {
            position: self.camera.screen_to_world(spawn),
            width: self.config.note_width,
            height: self.config.note_height,
        };
        let note = self.doc.create(input, self.owner_id.clone(), now, defaults)?.clone();
        debug!(id = %note.id, x = note.x, y = note.y, "note created");
        Ok(vec![Action::NoteCreated(note), Action::RenderNeeded])
    }

    /// Edit a note's title, content, color or tags.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` or `Validation`; the note is untouched on error.
    pub fn update_note(&mut self, id: &NoteId, mut patch: NotePatch, now: i64) -> Result<Vec<Action>, CanvasError> {
        if let Some(tags) = patch.tags.take() {
            patch.tags = Some(normalize_tags(tags));
        }
        self.doc.apply_patch(id, &patch, now)?;
        Ok(vec![Action::NoteUpdated { id: *id, patch, updated_at: now }, Action::RenderNeeded])
    }

    /// Delete a note together with every connection touching it.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` for an unknown id.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<Vec<Action>, CanvasError> {
        if !self.doc.contains(id) {
            return Err(CanvasError::NoteNotFound(*id));
        }
        let cascaded = self.graph.remove_all_for_note(id);
        self.doc.remove(id);
        self.forget_missing_notes();
        debug!(%id, connections = cascaded.len(), "note deleted");
        Ok(vec![Action::NoteDeleted { id: *id }, Action::RenderNeeded])
    }

    /// Delete a connection after the user confirmed the prompt.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionNotFound` if the edge is already gone.
    pub fn confirm_delete_connection(&mut self, id: &ConnectionId) -> Result<Vec<Action>, CanvasError> {
        self.graph.remove(id).ok_or(CanvasError::ConnectionNotFound(*id))?;
        debug!(%id, "connection deleted");
        Ok(vec![Action::ConnectionDeleted { id: *id }, Action::RenderNeeded])
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if self.state.is_gesture() {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(screen_pt);
        let hit = self.hit_at_world(world);

        if let InteractionState::ConnectSelecting { from } = self.state {
            if button != Button::Primary {
                return Vec::new();
            }
            return match hit {
                Some(Hit::Note(id)) => self.connect_click(from, id),
                Some(Hit::Connection(id)) => vec![Action::ConfirmDeleteConnection { id }],
                None => Vec::new(),
            };
        }

        if is_pan_gesture(button, modifiers) {
            if matches!(hit, Some(Hit::Note(_))) {
                return Vec::new();
            }
            self.transition(InteractionState::Panning { last_screen: screen_pt });
            return vec![Action::SetCursor("grabbing".into())];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        match hit {
            Some(Hit::Note(id)) => {
                let Some(note) = self.doc.get(&id) else {
                    return Vec::new();
                };
                let grab_offset = Point::new(world.x - note.x, world.y - note.y);
                let (orig_x, orig_y) = (note.x, note.y);
                self.transition(InteractionState::Dragging { id, grab_offset, orig_x, orig_y });
                vec![Action::SetCursor("grabbing".into())]
            }
            Some(Hit::Connection(id)) => vec![Action::ConfirmDeleteConnection { id }],
            None => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        match self.state {
            InteractionState::Dragging { id, grab_offset, .. } => {
                let world = self.camera.screen_to_world(screen_pt);
                if self.doc.move_note(&id, world.x - grab_offset.x, world.y - grab_offset.y).is_none() {
                    return Vec::new();
                }
                vec![Action::RenderNeeded]
            }
            InteractionState::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.state = InteractionState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InteractionState::ConnectSelecting { .. } => vec![Action::SetCursor("crosshair".into())],
            InteractionState::Idle => {
                let cursor = match self.hit_at_world(self.camera.screen_to_world(screen_pt)) {
                    Some(Hit::Note(_)) => "grab",
                    Some(Hit::Connection(_)) => "pointer",
                    None => "default",
                };
                vec![Action::SetCursor(cursor.into())]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.end_gesture()
    }

    /// The pointer left the canvas. Ends a drag or pan exactly like pointer-up
    /// so the machine can't get stuck mid-gesture.
    pub fn on_pointer_leave(&mut self, _screen_pt: Point) -> Vec<Action> {
        self.end_gesture()
    }

    /// Wheel up zooms in, wheel down zooms out.
    pub fn on_wheel(&mut self, _screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy < 0.0 {
            self.zoom_in()
        } else if delta.dy > 0.0 {
            self.zoom_out()
        } else {
            Vec::new()
        }
    }

    /// `Escape` disarms connect mode, or abandons a drag and puts the note back.
    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        if key.0 != "Escape" {
            return Vec::new();
        }
        match self.state {
            InteractionState::ConnectSelecting { .. } => {
                self.transition(InteractionState::Idle);
                vec![Action::SetCursor("default".into()), Action::RenderNeeded]
            }
            InteractionState::Dragging { id, orig_x, orig_y, .. } => {
                self.doc.move_note(&id, orig_x, orig_y);
                self.transition(InteractionState::Idle);
                vec![Action::SetCursor("default".into()), Action::RenderNeeded]
            }
            InteractionState::Idle | InteractionState::Panning { .. } => Vec::new(),
        }
    }

    // --- Queries ---

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.doc
    }

    #[must_use]
    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    /// Look up a note by id.
    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.doc.get(id)
    }

    /// Look up a connection by id.
    #[must_use]
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.graph.get(id)
    }

    /// Note or connection under a screen-space point.
    #[must_use]
    pub fn hit(&self, screen_pt: Point) -> Option<Hit> {
        self.hit_at_world(self.camera.screen_to_world(screen_pt))
    }

    #[must_use]
    pub fn viewport(&self) -> (f64, f64, f64) {
        (self.viewport_width, self.viewport_height, self.dpr)
    }

    // --- Internals ---

    fn hit_at_world(&self, world: Point) -> Option<Hit> {
        hit::hit_test(world, &self.doc, &self.graph, &self.camera, self.config.edge_hit_slop_px)
    }

    fn connect_click(&mut self, from: Option<NoteId>, clicked: NoteId) -> Vec<Action> {
        let Some(first) = from else {
            self.transition(InteractionState::ConnectSelecting { from: Some(clicked) });
            return vec![Action::RenderNeeded];
        };
        if first == clicked {
            debug!(note = %clicked, "ignoring second click on connect source");
            return vec![Action::Warning(CanvasError::SelfEdge(clicked))];
        }

        self.transition(InteractionState::Idle);
        let mut actions = Vec::new();
        let result = if self.doc.contains(&first) {
            self.graph.add(first, clicked).cloned()
        } else {
            Err(CanvasError::NoteNotFound(first))
        };
        match result {
            Ok(conn) => {
                debug!(id = %conn.id, from = %first, to = %clicked, "connection created");
                actions.push(Action::ConnectionCreated(conn));
            }
            Err(e) => {
                warn!(error = %e, "connection rejected");
                actions.push(Action::Warning(e));
            }
        }
        actions.push(Action::SetCursor("default".into()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Finish a drag or pan. A drag emits exactly one position write.
    fn end_gesture(&mut self) -> Vec<Action> {
        match self.state {
            InteractionState::Dragging { id, .. } => {
                self.transition(InteractionState::Idle);
                let Some(note) = self.doc.get(&id) else {
                    return vec![Action::SetCursor("default".into())];
                };
                vec![
                    Action::NoteMoved { id, x: note.x, y: note.y },
                    Action::SetCursor("default".into()),
                    Action::RenderNeeded,
                ]
            }
            InteractionState::Panning { .. } => {
                self.transition(InteractionState::Idle);
                vec![Action::SetCursor("default".into())]
            }
            InteractionState::Idle | InteractionState::ConnectSelecting { .. } => Vec::new(),
        }
    }

    /// Drop references to notes that are no longer in the store.
    fn forget_missing_notes(&mut self) {
        match self.state {
            InteractionState::Dragging { id, .. } if !self.doc.contains(&id) => {
                self.transition(InteractionState::Idle);
            }
            InteractionState::ConnectSelecting { from: Some(id) } if !self.doc.contains(&id) => {
                self.transition(InteractionState::ConnectSelecting { from: None });
            }
            _ => {}
        }
    }

    fn transition(&mut self, next: InteractionState) {
        debug!(from = self.state.name(), to = next.name(), "interaction state");
        self.state = next;
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::with_config(config) }
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, notes: Vec<Note>, connections: Vec<Connection>) {
        self.core.load_snapshot(notes, connections);
    }

    pub fn reset_view(&mut self) {
        self.core.reset_view();
    }

    pub fn set_owner(&mut self, owner_id: Option<String>) {
        self.core.set_owner(owner_id);
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
    }

    // --- Delegated controls ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.core.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> Vec<Action> {
        self.core.reset_zoom()
    }

    pub fn toggle_connect_mode(&mut self) -> Vec<Action> {
        self.core.toggle_connect_mode()
    }

    /// # Errors
    ///
    /// See [`EngineCore::create_note`].
    pub fn create_note(&mut self, input: NoteInput, now: i64) -> Result<Vec<Action>, CanvasError> {
        self.core.create_note(input, now)
    }

    /// # Errors
    ///
    /// See [`EngineCore::update_note`].
    pub fn update_note(&mut self, id: &NoteId, patch: NotePatch, now: i64) -> Result<Vec<Action>, CanvasError> {
        self.core.update_note(id, patch, now)
    }

    /// # Errors
    ///
    /// See [`EngineCore::delete_note`].
    pub fn delete_note(&mut self, id: &NoteId) -> Result<Vec<Action>, CanvasError> {
        self.core.delete_note(id)
    }

    /// # Errors
    ///
    /// See [`EngineCore::confirm_delete_connection`].
    pub fn confirm_delete_connection(&mut self, id: &ConnectionId) -> Result<Vec<Action>, CanvasError> {
        self.core.confirm_delete_connection(id)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_pointer_leave(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_leave(screen_pt)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("2d context unavailable"));
        };
        let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
        render::draw(&ctx, &self.core)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        self.core.state()
    }

    #[must_use]
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.core.note(id)
    }
}
