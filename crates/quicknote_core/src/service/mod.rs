//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate note mutations and views over slot storage.
//! - Keep UI layers decoupled from storage details.

pub mod clock;
pub mod note_query;
pub mod note_store;
