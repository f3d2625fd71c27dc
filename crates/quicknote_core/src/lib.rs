//! Core domain logic for QuickNote.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use config::{
    ConfigError, CoreConfig, LoggingConfig, StorageBackend, StorageConfig, DEFAULT_STORAGE_KEY,
};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::note::{
    Note, NoteCategory, NoteColor, NoteId, NoteOptions, NotePatch, NotePriority, NoteStats,
    ParseValueError, SortOption,
};
pub use service::clock::{Clock, SystemClock};
pub use service::note_query::NoteQuery;
pub use service::note_store::{LoadOutcome, NoteStore, StoreError, StoreResult};
pub use storage::{
    open_storage, FileStorage, MemoryStorage, NullStorage, SlotStorage, SqliteStorage,
    StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
