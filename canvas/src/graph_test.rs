use uuid::Uuid;

use super::*;
use crate::doc::{Note, NoteColor};

fn ids(n: usize) -> Vec<NoteId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn note_with_id(id: NoteId) -> Note {
    Note {
        id,
        title: "t".into(),
        content: "c".into(),
        owner_id: None,
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        color: NoteColor::Blue,
        tags: Vec::new(),
        created_at: 0,
        updated_at: 0,
    }
}

// =============================================================
// add
// =============================================================

#[test]
fn add_creates_edge() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    let conn = graph.add(n[0], n[1]).unwrap().clone();
    assert_eq!(conn.from_note_id, n[0]);
    assert_eq!(conn.to_note_id, n[1]);
    assert_eq!(graph.len(), 1);
    assert!(graph.is_connected(n[1], n[0]));
}

#[test]
fn add_reverse_pair_is_rejected() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    let err = graph.add(n[1], n[0]).unwrap_err();
    assert_eq!(err, CanvasError::DuplicateEdge { a: n[1], b: n[0] });
    assert_eq!(graph.len(), 1);
}

#[test]
fn add_same_direction_twice_is_rejected() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    assert!(graph.add(n[0], n[1]).is_err());
    assert_eq!(graph.len(), 1);
}

#[test]
fn add_self_edge_is_rejected() {
    let n = ids(1);
    let mut graph = ConnectionGraph::new();
    let err = graph.add(n[0], n[0]).unwrap_err();
    assert_eq!(err, CanvasError::SelfEdge(n[0]));
    assert!(err.is_edge_warning());
    assert!(graph.is_empty());
}

// =============================================================
// remove / cascade
// =============================================================

#[test]
fn remove_single_edge() {
    let n = ids(3);
    let mut graph = ConnectionGraph::new();
    let ab = graph.add(n[0], n[1]).unwrap().id;
    graph.add(n[1], n[2]).unwrap();
    let removed = graph.remove(&ab).unwrap();
    assert_eq!(removed.id, ab);
    assert!(!graph.is_connected(n[0], n[1]));
    assert!(graph.is_connected(n[1], n[2]));
    assert!(graph.remove(&ab).is_none());
}

#[test]
fn removed_pair_can_be_reconnected() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    let id = graph.add(n[0], n[1]).unwrap().id;
    graph.remove(&id);
    assert!(graph.add(n[1], n[0]).is_ok());
}

#[test]
fn remove_all_for_note_leaves_no_references() {
    let n = ids(4);
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    graph.add(n[2], n[0]).unwrap();
    graph.add(n[2], n[3]).unwrap();
    let removed = graph.remove_all_for_note(&n[0]);
    assert_eq!(removed.len(), 2);
    assert_eq!(graph.iter().filter(|c| c.touches(&n[0])).count(), 0);
    assert!(graph.edges_of(&n[0]).is_empty());
    assert_eq!(graph.len(), 1);
    assert!(graph.is_connected(n[2], n[3]));
}

#[test]
fn remove_all_for_unconnected_note_is_noop() {
    let n = ids(3);
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    assert!(graph.remove_all_for_note(&n[2]).is_empty());
    assert_eq!(graph.len(), 1);
}

// =============================================================
// adjacency
// =============================================================

#[test]
fn edges_of_lists_both_directions() {
    let n = ids(3);
    let mut graph = ConnectionGraph::new();
    let ab = graph.add(n[0], n[1]).unwrap().id;
    let ca = graph.add(n[2], n[0]).unwrap().id;
    let adjacent: Vec<_> = graph.edges_of(&n[0]).into_iter().map(|c| c.id).collect();
    assert_eq!(adjacent, vec![ab, ca]);
    assert_eq!(graph.edges_of(&n[1]).len(), 1);
}

// =============================================================
// snapshot / pruning
// =============================================================

#[test]
fn load_snapshot_dedups_unordered_pairs() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    graph.load_snapshot(vec![
        Connection { id: Uuid::new_v4(), from_note_id: n[0], to_note_id: n[1] },
        Connection { id: Uuid::new_v4(), from_note_id: n[1], to_note_id: n[0] },
        Connection { id: Uuid::new_v4(), from_note_id: n[0], to_note_id: n[0] },
    ]);
    assert_eq!(graph.len(), 1);
}

#[test]
fn insert_skips_existing_pair() {
    let n = ids(2);
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    let dup = Connection { id: Uuid::new_v4(), from_note_id: n[1], to_note_id: n[0] };
    assert!(!graph.insert(dup));
    let fresh = Connection { id: Uuid::new_v4(), from_note_id: n[1], to_note_id: Uuid::new_v4() };
    assert!(graph.insert(fresh));
    assert_eq!(graph.len(), 2);
}

#[test]
fn prune_dangling_drops_edges_to_missing_notes() {
    let n = ids(3);
    let mut notes = DocStore::new();
    notes.insert(note_with_id(n[0]));
    notes.insert(note_with_id(n[1]));
    let mut graph = ConnectionGraph::new();
    graph.add(n[0], n[1]).unwrap();
    graph.add(n[1], n[2]).unwrap();
    let removed = graph.prune_dangling(&notes);
    assert_eq!(removed.len(), 1);
    assert!(removed[0].touches(&n[2]));
    assert_eq!(graph.len(), 1);
    assert!(graph.edges_of(&n[2]).is_empty());
}

#[test]
fn connection_serde_shape() {
    let conn = Connection { id: Uuid::nil(), from_note_id: Uuid::nil(), to_note_id: Uuid::nil() };
    let json = serde_json::to_value(&conn).unwrap();
    assert!(json.get("from_note_id").is_some());
    assert!(json.get("to_note_id").is_some());
}
