//! Shared numeric constants for the canvas crate.

// ── Canvas bounds ───────────────────────────────────────────────

/// Default width of the logical canvas in world units.
pub const CANVAS_MAX_X: f64 = 3000.0;

/// Default height of the logical canvas in world units.
pub const CANVAS_MAX_Y: f64 = 2000.0;

// ── Notes ───────────────────────────────────────────────────────

/// Width assigned to a new note when none is supplied.
pub const DEFAULT_NOTE_WIDTH: f64 = 250.0;

/// Height assigned to a new note when none is supplied.
pub const DEFAULT_NOTE_HEIGHT: f64 = 200.0;

/// Screen-space rectangle (origin, extent) in which new notes are dropped.
pub const SPAWN_ORIGIN_PX: f64 = 50.0;
pub const SPAWN_RANGE_X_PX: f64 = 400.0;
pub const SPAWN_RANGE_Y_PX: f64 = 300.0;

// ── Zoom ────────────────────────────────────────────────────────

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space slop in pixels for clicking a connection line.
pub const EDGE_HIT_SLOP_PX: f64 = 6.0;
