//! Key-value slot storage contracts and backends.
//!
//! # Responsibility
//! - Define the `get`/`set` contract the notes store persists through.
//! - Provide in-memory, file, SQLite and no-op backends.
//! - Build a backend from [`StorageConfig`].
//!
//! # Invariants
//! - `set` overwrites the previous value of a slot in full.
//! - A missing slot is `Ok(None)`, never an error.

use crate::config::{StorageBackend, StorageConfig};
use crate::db::DbError;
use log::{error, info};
use std::path::PathBuf;
use thiserror::Error;

mod file;
mod memory;
mod null;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use null::NullStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Write rejected because the backend quota would be exceeded.
    #[error("quota exceeded writing slot `{key}`: {size} bytes over a {quota} byte quota")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },
    /// File-system failure in the file backend.
    #[error("storage I/O failed at `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// SQLite failure in the database backend.
    #[error("storage database error: {0}")]
    Db(#[from] DbError),
    /// Backend cannot serve requests at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value slots, as offered by browser local storage.
pub trait SlotStorage {
    /// Reads a slot; `Ok(None)` when it was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Overwrites a slot with `value`.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

impl<T: SlotStorage + ?Sized> SlotStorage for &mut T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

/// Opens the backend selected by configuration.
///
/// # Errors
/// - Returns `Db` when the SQLite database cannot be opened or migrated.
pub fn open_storage(config: &StorageConfig) -> StorageResult<Box<dyn SlotStorage>> {
    let opened: StorageResult<Box<dyn SlotStorage>> = match config.backend {
        StorageBackend::Memory => Ok(Box::new(match config.quota_bytes {
            Some(quota) => MemoryStorage::with_quota(quota),
            None => MemoryStorage::new(),
        })),
        StorageBackend::File => Ok(Box::new(FileStorage::new(config.path.clone()))),
        StorageBackend::Sqlite => {
            SqliteStorage::open(&config.path)
                .map(|storage| Box::new(storage) as Box<dyn SlotStorage>)
        }
        StorageBackend::None => Ok(Box::new(NullStorage)),
    };

    match &opened {
        Ok(_) => info!(
            "event=storage_open module=storage status=ok backend={}",
            config.backend
        ),
        Err(err) => error!(
            "event=storage_open module=storage status=error backend={} error={}",
            config.backend, err
        ),
    }
    opened
}
