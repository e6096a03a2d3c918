#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport state for pan/zoom on the notes canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels.
/// `zoom` is a scale factor in `[ZOOM_MIN, ZOOM_MAX]` (1.0 = no zoom).
/// Session-scoped: never persisted, reset whenever the canvas is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Step the zoom up by one increment. A no-op at `ZOOM_MAX`.
    pub fn zoom_in(&mut self) {
        self.zoom = snap_zoom(self.zoom + ZOOM_STEP);
    }

    /// Step the zoom down by one increment. A no-op at `ZOOM_MIN`.
    pub fn zoom_out(&mut self) {
        self.zoom = snap_zoom(self.zoom - ZOOM_STEP);
    }

    /// Return to 1:1 zoom. Pan is left where it is.
    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Shift the pan offset by a raw screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}

/// Round to the nearest tenth so repeated steps don't accumulate float error,
/// then clamp into the allowed range.
fn snap_zoom(zoom: f64) -> f64 {
    ((zoom * 10.0).round() / 10.0).clamp(ZOOM_MIN, ZOOM_MAX)
}
