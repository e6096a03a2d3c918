//! Connection graph: undirected edges between notes.
//!
//! Edges store only the two note ids. An edge is identified by its own id but
//! deduplicated by the unordered pair of endpoints, so `add(a, b)` and
//! `add(b, a)` name the same edge. A `note -> [edge]` side index is rebuilt
//! on every structural change to keep adjacency queries and cascade deletes
//! off the linear path.

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::doc::{DocStore, NoteId};
use crate::error::CanvasError;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// A visual link between two notes. Semantically undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from_note_id: NoteId,
    pub to_note_id: NoteId,
}

impl Connection {
    /// Whether `note` is either endpoint.
    #[must_use]
    pub fn touches(&self, note: &NoteId) -> bool {
        self.from_note_id == *note || self.to_note_id == *note
    }

    /// The endpoints as an order-independent key.
    #[must_use]
    pub fn pair(&self) -> (NoteId, NoteId) {
        pair_key(self.from_note_id, self.to_note_id)
    }
}

fn pair_key(a: NoteId, b: NoteId) -> (NoteId, NoteId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Edge set over note ids, kept in insertion order.
#[derive(Default)]
pub struct ConnectionGraph {
    edges: Vec<Connection>,
    pairs: HashSet<(NoteId, NoteId)>,
    adjacency: HashMap<NoteId, Vec<ConnectionId>>,
}

impl ConnectionGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect two notes.
    ///
    /// # Errors
    ///
    /// Returns `SelfEdge` when `from == to` and `DuplicateEdge` when the pair is
    /// already connected in either direction. The graph is unchanged on error.
    pub fn add(&mut self, from: NoteId, to: NoteId) -> Result<&Connection, CanvasError> {
        if from == to {
            return Err(CanvasError::SelfEdge(from));
        }
        if self.is_connected(from, to) {
            return Err(CanvasError::DuplicateEdge { a: from, b: to });
        }
        let id = Uuid::new_v4();
        self.edges.push(Connection { id, from_note_id: from, to_note_id: to });
        self.rebuild_index();
        self.get(&id).ok_or(CanvasError::ConnectionNotFound(id))
    }

    /// Insert a connection received from the backing store. Pairs that are
    /// already present or self-referencing are skipped.
    pub fn insert(&mut self, conn: Connection) -> bool {
        if conn.from_note_id == conn.to_note_id || self.pairs.contains(&conn.pair()) || self.get(&conn.id).is_some() {
            return false;
        }
        self.edges.push(conn);
        self.rebuild_index();
        true
    }

    /// Delete a single edge, returning it if it was present.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        let pos = self.edges.iter().position(|c| c.id == *id)?;
        let removed = self.edges.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    /// Delete every edge touching `note`. Returns the removed edges.
    pub fn remove_all_for_note(&mut self, note: &NoteId) -> Vec<Connection> {
        let Some(ids) = self.adjacency.get(note).cloned() else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|c| ids.contains(&c.id));
        self.edges = kept;
        self.rebuild_index();
        removed
    }

    /// Edges adjacent to `note`, in insertion order.
    #[must_use]
    pub fn edges_of(&self, note: &NoteId) -> Vec<&Connection> {
        let Some(ids) = self.adjacency.get(note) else {
            return Vec::new();
        };
        self.edges.iter().filter(|c| ids.contains(&c.id)).collect()
    }

    /// Whether an edge exists between `a` and `b` in either direction.
    #[must_use]
    pub fn is_connected(&self, a: NoteId, b: NoteId) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }

    #[must_use]
    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.edges.iter().find(|c| c.id == *id)
    }

    /// Replace all edges with a full snapshot.
    pub fn load_snapshot(&mut self, connections: Vec<Connection>) {
        self.edges.clear();
        self.pairs.clear();
        self.adjacency.clear();
        for conn in connections {
            if conn.from_note_id == conn.to_note_id || !self.pairs.insert(conn.pair()) {
                tracing::warn!(id = %conn.id, "skipping self or duplicate connection in snapshot");
                continue;
            }
            self.edges.push(conn);
        }
        self.rebuild_index();
    }

    /// Drop edges whose endpoints are missing from `notes`. Returns the removed edges.
    pub fn prune_dangling(&mut self, notes: &DocStore) -> Vec<Connection> {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|c| notes.contains(&c.from_note_id) && notes.contains(&c.to_note_id));
        self.edges = kept;
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "pruned dangling connections");
            self.rebuild_index();
        }
        removed
    }

    /// All edges in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Connection> {
        self.edges.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.pairs.clear();
        self.adjacency.clear();
        for conn in &self.edges {
            self.pairs.insert(conn.pair());
            self.adjacency.entry(conn.from_note_id).or_default().push(conn.id);
            self.adjacency.entry(conn.to_note_id).or_default().push(conn.id);
        }
    }
}
