//! Notes canvas engine: viewport, note store, connection graph, and input.
//!
//! This crate is compiled natively for the host-side session and to
//! WebAssembly for the browser. It owns the whole interactive model of the
//! canvas: translating raw pointer events into note and connection mutations,
//! maintaining the pan/zoom viewport, hit-testing notes and connection lines,
//! and rendering the scene. It performs no I/O: every operation returns
//! [`engine::Action`]s, and the host persists the mutating ones and reloads.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] controller |
//! | [`doc`] | Note types and the insertion-ordered note store |
//! | [`graph`] | Undirected connection graph with adjacency index |
//! | [`camera`] | Pan/zoom viewport and coordinate conversions |
//! | [`input`] | Input event types and the interaction state machine |
//! | [`hit`] | Hit-testing against notes and connection lines |
//! | [`render`] | Canvas 2D scene rendering |
//! | [`error`] | Engine error taxonomy |
//! | [`consts`] | Shared numeric constants (bounds, zoom limits, sizes) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hit;
pub mod input;
pub mod render;

pub use camera::{Camera, Point};
pub use doc::{CanvasBounds, Note, NoteColor, NoteId, NoteInput, NotePatch};
pub use engine::{Action, EngineConfig, EngineCore};
pub use error::CanvasError;
pub use graph::{Connection, ConnectionId};
pub use input::{Button, InteractionState, Key, Modifiers, WheelDelta};
