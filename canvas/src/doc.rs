//! Document model: notes, their palette, and the in-memory note store.
//!
//! This module defines what sits on the canvas (`Note`, `NoteColor`), the
//! inputs used to create and edit notes (`NoteInput`, `NotePatch`), and the
//! runtime store that owns all live notes (`DocStore`).
//!
//! Data flows into this layer from the persistence snapshot (full reload) and
//! from the input engine (local optimistic mutations). The store keeps notes
//! in insertion order; that order is both the draw order and the z-order used
//! by hit-testing, so the last note in the store is the topmost one.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{CANVAS_MAX_X, CANVAS_MAX_Y};
use crate::error::CanvasError;

/// Unique identifier for a note.
pub type NoteId = Uuid;

/// The fixed sticky-note palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Blue,
    Green,
    Purple,
    Pink,
    Orange,
}

impl NoteColor {
    /// Every palette entry, in picker order.
    pub const ALL: [NoteColor; 6] = [Self::Yellow, Self::Blue, Self::Green, Self::Purple, Self::Pink, Self::Orange];

    /// Lowercase palette name as stored by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Orange => "orange",
        }
    }

    /// Parse a stored palette name. Unknown names fall back to the default color.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or_default()
    }

    /// Note body fill.
    #[must_use]
    pub fn fill(self) -> &'static str {
        match self {
            Self::Yellow => "#FEF08A",
            Self::Blue => "#BFDBFE",
            Self::Green => "#BBF7D0",
            Self::Purple => "#E9D5FF",
            Self::Pink => "#FBCFE8",
            Self::Orange => "#FED7AA",
        }
    }

    /// Note outline.
    #[must_use]
    pub fn border(self) -> &'static str {
        match self {
            Self::Yellow => "#FDE047",
            Self::Blue => "#93C5FD",
            Self::Green => "#86EFAC",
            Self::Purple => "#D8B4FE",
            Self::Pink => "#F9A8D4",
            Self::Orange => "#FDBA74",
        }
    }

    /// Text drawn on top of the fill.
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Yellow => "#713F12",
            Self::Blue => "#1E3A8A",
            Self::Green => "#14532D",
            Self::Purple => "#581C87",
            Self::Pink => "#831843",
            Self::Orange => "#7C2D12",
        }
    }
}

/// A sticky note as held in the store and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note.
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// User who created the note, as reported by the identity provider.
    pub owner_id: Option<String>,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: NoteColor,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last edit time, epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// World-space center of the note's bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether `world` lies inside `[x, x+width] × [y, y+height]`.
    #[must_use]
    pub fn contains(&self, world: Point) -> bool {
        world.x >= self.x && world.x <= self.x + self.width && world.y >= self.y && world.y <= self.y + self.height
    }
}

/// Fields supplied when creating a note. Absent geometry falls back to
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Sparse edit for a note's text, color and tags. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NoteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.color.is_none() && self.tags.is_none()
    }
}

/// Extent of the logical canvas. Notes must fit entirely inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self { max_x: CANVAS_MAX_X, max_y: CANVAS_MAX_Y }
    }
}

impl CanvasBounds {
    /// Clamp a top-left corner so a `width × height` box stays on the canvas.
    #[must_use]
    pub fn clamp_origin(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let max_x = (self.max_x - width).max(0.0);
        let max_y = (self.max_y - height).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }
}

/// Values the engine supplies for a note whose input omits them.
#[derive(Debug, Clone, Copy)]
pub struct NoteDefaults {
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

/// In-memory store of notes, ordered by insertion (z-order).
pub struct DocStore {
    notes: HashMap<NoteId, Note>,
    order: Vec<NoteId>,
    bounds: CanvasBounds,
}

impl DocStore {
    /// Create an empty store with the default canvas bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(CanvasBounds::default())
    }

    /// Create an empty store that clamps notes to `bounds`.
    #[must_use]
    pub fn with_bounds(bounds: CanvasBounds) -> Self {
        Self { notes: HashMap::new(), order: Vec::new(), bounds }
    }

    #[must_use]
    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    /// Build a note from `input`, stamp it, and append it on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the title or content is blank, if a supplied
    /// width/height is not positive, or if the position is not finite.
    pub fn create(
        &mut self,
        input: NoteInput,
        owner_id: Option<String>,
        now: i64,
        defaults: NoteDefaults,
    ) -> Result<&Note, CanvasError> {
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;

        let width = input.width.unwrap_or(defaults.width);
        let height = input.height.unwrap_or(defaults.height);
        if width.is_nan() || width <= 0.0 {
            return Err(CanvasError::Validation { field: "width" });
        }
        if height.is_nan() || height <= 0.0 {
            return Err(CanvasError::Validation { field: "height" });
        }
        let width = width.min(self.bounds.max_x);
        let height = height.min(self.bounds.max_y);

        let x = input.x.unwrap_or(defaults.position.x);
        let y = input.y.unwrap_or(defaults.position.y);
        if !x.is_finite() {
            return Err(CanvasError::Validation { field: "x" });
        }
        if !y.is_finite() {
            return Err(CanvasError::Validation { field: "y" });
        }
        let (x, y) = self.bounds.clamp_origin(x, y, width, height);

        let note = Note {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            owner_id,
            x,
            y,
            width,
            height,
            color: input.color,
            tags: normalize_tags(input.tags),
            created_at: now,
            updated_at: now,
        };
        let id = note.id;
        self.insert(note);
        self.notes.get(&id).ok_or(CanvasError::NoteNotFound(id))
    }

    /// Insert or replace a note. A new id goes on top; a replaced note keeps
    /// its place in the stack.
    pub fn insert(&mut self, note: Note) {
        if !self.notes.contains_key(&note.id) {
            self.order.push(note.id);
        }
        self.notes.insert(note.id, note);
    }

    /// Remove a note by id, returning it if it was present.
    ///
    /// Callers are responsible for dropping the note's connections first.
    pub fn remove(&mut self, id: &NoteId) -> Option<Note> {
        let removed = self.notes.remove(id)?;
        self.order.retain(|n| n != id);
        Some(removed)
    }

    /// Return a reference to a note by id.
    #[must_use]
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.contains_key(id)
    }

    /// Move a note's top-left corner, clamped so it stays on the canvas.
    ///
    /// Returns the position actually applied, or `None` if the note is missing
    /// or the target is not finite; the note is left where it was.
    pub fn move_note(&mut self, id: &NoteId, x: f64, y: f64) -> Option<Point> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let note = self.notes.get_mut(id)?;
        let (x, y) = self.bounds.clamp_origin(x, y, note.width, note.height);
        note.x = x;
        note.y = y;
        Some(Point::new(x, y))
    }

    /// Merge `patch` into a note and stamp `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NoteNotFound` for an unknown id and `Validation` if the merged
    /// title or content would be blank. Nothing is changed on error.
    pub fn apply_patch(&mut self, id: &NoteId, patch: &NotePatch, now: i64) -> Result<&Note, CanvasError> {
        let note = self.notes.get_mut(id).ok_or(CanvasError::NoteNotFound(*id))?;
        require_text("title", patch.title.as_deref().unwrap_or(&note.title))?;
        require_text("content", patch.content.as_deref().unwrap_or(&note.content))?;

        if let Some(title) = &patch.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &patch.content {
            note.content.clone_from(content);
        }
        if let Some(color) = patch.color {
            note.color = color;
        }
        if let Some(tags) = &patch.tags {
            note.tags = normalize_tags(tags.clone());
        }
        note.updated_at = now;
        Ok(&*note)
    }

    /// Replace all notes with a full snapshot, keeping the snapshot's order.
    ///
    /// Positions are clamped to the current bounds so the local view never
    /// shows a note off the canvas. Rows with non-finite geometry or a
    /// non-positive size are skipped.
    pub fn load_snapshot(&mut self, notes: Vec<Note>) {
        self.notes.clear();
        self.order.clear();
        for mut note in notes {
            let finite = [note.x, note.y, note.width, note.height].iter().all(|v| v.is_finite());
            if !finite || note.width <= 0.0 || note.height <= 0.0 {
                warn!(id = %note.id, "skipping note with invalid geometry");
                continue;
            }
            note.width = note.width.min(self.bounds.max_x);
            note.height = note.height.min(self.bounds.max_y);
            let (x, y) = self.bounds.clamp_origin(note.x, note.y, note.width, note.height);
            note.x = x;
            note.y = y;
            self.insert(note);
        }
    }

    /// Notes bottom-to-top, the order they are drawn in.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Note> {
        self.order.iter().filter_map(|id| self.notes.get(id))
    }

    /// Number of notes currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Returns `true` if the store contains no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), CanvasError> {
    if value.trim().is_empty() {
        return Err(CanvasError::Validation { field });
    }
    Ok(())
}

/// Trim tags and drop the empty ones.
#[must_use]
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}
