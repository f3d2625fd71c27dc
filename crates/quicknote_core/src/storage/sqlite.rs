//! SQLite-backed slot storage.
//!
//! # Responsibility
//! - Persist slots as rows of the `storage_slots` table.
//! - Own the connection for the lifetime of the storage value.
//!
//! # Invariants
//! - Connections are migrated before the storage is constructed.
//! - `set` is a single upsert statement.

use super::{SlotStorage, StorageResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Slots stored in a SQLite database.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a throwaway in-memory database.
    pub fn in_memory() -> StorageResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a connection that already carries the slot schema.
    ///
    /// # Errors
    /// - Returns `MissingRequiredTable` when `storage_slots` is absent.
    pub fn from_connection(conn: Connection) -> StorageResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'storage_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(DbError::MissingRequiredTable("storage_slots").into());
        }
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SlotStorage for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM storage_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO storage_slots (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
