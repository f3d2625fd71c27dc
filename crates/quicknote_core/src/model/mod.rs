//! Note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by store logic and storage.
//! - Keep the persisted shape compatible with slots written by the web build.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard removal from the collection.

pub mod note;
