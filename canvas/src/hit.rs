//! Hit-testing: resolve a world-space point to a note or a connection line.
//!
//! Notes are tested against their bounding boxes, topmost first (last in store
//! order wins). Connection lines are tested by distance to the segment joining
//! the two endpoint centers; the tolerance is given in screen pixels and
//! divided by zoom so the clickable width looks the same at every zoom level.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::doc::{DocStore, NoteId};
use crate::graph::{ConnectionGraph, ConnectionId};

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Note(NoteId),
    Connection(ConnectionId),
}

/// Topmost note whose bounding box contains `world_pt`.
#[must_use]
pub fn hit_note(world_pt: Point, doc: &DocStore) -> Option<NoteId> {
    doc.iter().rev().find(|n| n.contains(world_pt)).map(|n| n.id)
}

/// Connection line within `slop_px` screen pixels of `world_pt`.
///
/// Later connections win when several lines are in range. Edges whose
/// endpoints are missing from `doc` are ignored.
#[must_use]
pub fn hit_connection(
    world_pt: Point,
    doc: &DocStore,
    graph: &ConnectionGraph,
    camera: &Camera,
    slop_px: f64,
) -> Option<ConnectionId> {
    let tolerance = camera.screen_dist_to_world(slop_px);
    graph.iter().rev().find_map(|conn| {
        let a = doc.get(&conn.from_note_id)?.center();
        let b = doc.get(&conn.to_note_id)?.center();
        (dist_to_segment(world_pt, a, b) <= tolerance).then_some(conn.id)
    })
}

/// Test which note or connection (if any) is under `world_pt`. Notes are drawn
/// above lines, so they take precedence.
#[must_use]
pub fn hit_test(
    world_pt: Point,
    doc: &DocStore,
    graph: &ConnectionGraph,
    camera: &Camera,
    slop_px: f64,
) -> Option<Hit> {
    if let Some(id) = hit_note(world_pt, doc) {
        return Some(Hit::Note(id));
    }
    hit_connection(world_pt, doc, graph, camera, slop_px).map(Hit::Connection)
}

/// Euclidean distance from `p` to the closed segment `a`–`b`.
#[must_use]
pub fn dist_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (p.x - a.x).hypot(p.y - a.y);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * dx, a.y + t * dy);
    (p.x - proj.x).hypot(p.y - proj.y)
}
