#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::{Note, NoteColor};

fn note_at(x: f64, y: f64, w: f64, h: f64) -> Note {
    Note {
        id: Uuid::new_v4(),
        title: "t".into(),
        content: "c".into(),
        owner_id: None,
        x,
        y,
        width: w,
        height: h,
        color: NoteColor::Yellow,
        tags: Vec::new(),
        created_at: 0,
        updated_at: 0,
    }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Two 100×100 notes centered at (50,50) and (450,50), joined by an edge.
fn two_connected() -> (DocStore, ConnectionGraph, ConnectionId) {
    let a = note_at(0.0, 0.0, 100.0, 100.0);
    let b = note_at(400.0, 0.0, 100.0, 100.0);
    let mut graph = ConnectionGraph::new();
    let edge = graph.add(a.id, b.id).unwrap().id;
    let mut doc = DocStore::new();
    doc.insert(a);
    doc.insert(b);
    (doc, graph, edge)
}

// =============================================================
// dist_to_segment
// =============================================================

#[test]
fn distance_perpendicular_to_segment() {
    assert_eq!(dist_to_segment(pt(5.0, 3.0), pt(0.0, 0.0), pt(10.0, 0.0)), 3.0);
}

#[test]
fn distance_beyond_endpoint_uses_endpoint() {
    assert_eq!(dist_to_segment(pt(13.0, 4.0), pt(0.0, 0.0), pt(10.0, 0.0)), 5.0);
}

#[test]
fn distance_to_degenerate_segment() {
    assert_eq!(dist_to_segment(pt(3.0, 4.0), pt(0.0, 0.0), pt(0.0, 0.0)), 5.0);
}

// =============================================================
// notes
// =============================================================

#[test]
fn empty_canvas_hits_nothing() {
    let doc = DocStore::new();
    let graph = ConnectionGraph::new();
    assert!(hit_test(pt(1.0, 1.0), &doc, &graph, &Camera::default(), 6.0).is_none());
}

#[test]
fn point_inside_note_hits_it() {
    let mut doc = DocStore::new();
    let n = note_at(100.0, 100.0, 250.0, 200.0);
    let id = n.id;
    doc.insert(n);
    assert_eq!(hit_note(pt(200.0, 150.0), &doc), Some(id));
    assert_eq!(hit_note(pt(99.0, 150.0), &doc), None);
}

#[test]
fn overlapping_notes_last_created_wins() {
    let mut doc = DocStore::new();
    let below = note_at(0.0, 0.0, 200.0, 200.0);
    let above = note_at(100.0, 100.0, 200.0, 200.0);
    let (below_id, above_id) = (below.id, above.id);
    doc.insert(below);
    doc.insert(above);
    assert_eq!(hit_note(pt(150.0, 150.0), &doc), Some(above_id));
    assert_eq!(hit_note(pt(50.0, 50.0), &doc), Some(below_id));
}

#[test]
fn z_order_follows_snapshot_order() {
    let first = note_at(0.0, 0.0, 200.0, 200.0);
    let second = note_at(0.0, 0.0, 200.0, 200.0);
    let (first_id, second_id) = (first.id, second.id);
    let mut doc = DocStore::new();
    doc.load_snapshot(vec![second.clone(), first.clone()]);
    assert_eq!(hit_note(pt(10.0, 10.0), &doc), Some(first_id));
    doc.load_snapshot(vec![first, second]);
    assert_eq!(hit_note(pt(10.0, 10.0), &doc), Some(second_id));
}

// =============================================================
// connections
// =============================================================

#[test]
fn point_near_line_hits_connection() {
    let (doc, graph, edge) = two_connected();
    let cam = Camera::default();
    assert_eq!(hit_test(pt(250.0, 54.0), &doc, &graph, &cam, 6.0), Some(Hit::Connection(edge)));
    assert_eq!(hit_test(pt(250.0, 57.0), &doc, &graph, &cam, 6.0), None);
}

#[test]
fn note_beats_line_underneath() {
    let (doc, graph, _) = two_connected();
    let hit = hit_test(pt(60.0, 50.0), &doc, &graph, &Camera::default(), 6.0);
    assert!(matches!(hit, Some(Hit::Note(_))));
}

#[test]
fn line_tolerance_is_constant_in_screen_pixels() {
    let (doc, graph, edge) = two_connected();
    // 4 world units off the line: 8 px at zoom 2, 2 px at zoom 0.5.
    let zoomed_in = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 };
    assert_eq!(hit_connection(pt(250.0, 54.0), &doc, &graph, &zoomed_in, 6.0), None);
    let zoomed_out = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 0.5 };
    assert_eq!(hit_connection(pt(250.0, 54.0), &doc, &graph, &zoomed_out, 6.0), Some(edge));
    assert_eq!(hit_connection(pt(250.0, 61.0), &doc, &graph, &zoomed_out, 6.0), Some(edge));
}

#[test]
fn dangling_edge_is_not_hittable() {
    let (mut doc, graph, _) = two_connected();
    let ids: Vec<_> = doc.iter().map(|n| n.id).collect();
    doc.remove(&ids[1]);
    assert_eq!(hit_connection(pt(250.0, 50.0), &doc, &graph, &Camera::default(), 6.0), None);
}

#[test]
fn crossing_lines_latest_connection_wins() {
    let a = note_at(0.0, 200.0, 100.0, 100.0);
    let b = note_at(400.0, 200.0, 100.0, 100.0);
    let c = note_at(200.0, 0.0, 100.0, 100.0);
    let d = note_at(200.0, 400.0, 100.0, 100.0);
    let mut graph = ConnectionGraph::new();
    let first = graph.add(a.id, b.id).unwrap().id;
    let second = graph.add(c.id, d.id).unwrap().id;
    let mut doc = DocStore::new();
    for n in [a, b, c, d] {
        doc.insert(n);
    }
    let cam = Camera::default();
    assert_eq!(hit_connection(pt(250.0, 250.0), &doc, &graph, &cam, 6.0), Some(second));
    assert_eq!(hit_connection(pt(150.0, 250.0), &doc, &graph, &cam, 6.0), Some(first));
}
