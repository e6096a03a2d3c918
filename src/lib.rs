//! Notes board host.
//!
//! The `canvas` crate owns geometry, the interaction state machine, and the
//! in-memory note and connection sets. It never performs I/O. This crate
//! supplies everything around it:
//!
//! | Module    | Role                                                       |
//! |-----------|------------------------------------------------------------|
//! | `config`  | environment-driven settings, converted into `EngineConfig` |
//! | `repo`    | persistence and identity collaborators (memory, Postgres)  |
//! | `db`      | Postgres pool setup and embedded migrations                |
//! | `session` | drives the engine, persists its mutations, reloads         |

pub mod config;
pub mod db;
pub mod repo;
pub mod session;

pub use config::BoardConfig;
pub use repo::{ConnectionRepo, Identity, NoteRepo, NoteUpdate, RepoError, StaticIdentity};
pub use session::{CanvasSession, Outcome, SessionError};
