//! Notes store: the in-memory collection mirrored to one storage slot.
//!
//! # Responsibility
//! - Own the note collection and expose add/update/delete/toggle.
//! - Serve filtered views, tag listing and aggregate counts.
//! - Load the slot once at open and write it back after every mutation.
//!
//! # Invariants
//! - Note ids are unique across the collection at all times.
//! - Storage failures are logged and absorbed; a failed write never rolls
//!   back the in-memory mutation.
//! - Read operations never touch storage.

use crate::config::{StorageConfig, DEFAULT_STORAGE_KEY};
use crate::model::note::{
    Note, NoteCategory, NoteId, NoteOptions, NotePatch, NoteStats, SortOption,
};
use crate::service::clock::{Clock, SystemClock};
use crate::service::note_query::NoteQuery;
use crate::storage::{SlotStorage, StorageError};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of reading the storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Slot parsed; the collection now holds this many notes.
    Loaded(usize),
    /// Slot never written; the collection was left as it was.
    Missing,
    /// Slot unreadable or malformed; the collection was reset to empty.
    Reset,
}

/// In-memory note collection persisted through a [`SlotStorage`].
pub struct NoteStore<S: SlotStorage, C: Clock = SystemClock> {
    storage: S,
    clock: C,
    storage_key: String,
    notes: Vec<Note>,
}

impl<S: SlotStorage> NoteStore<S, SystemClock> {
    /// Creates an empty store on the default slot without reading storage.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }

    /// Creates a store on the default slot and loads it.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    /// Creates a store on the configured slot and loads it.
    pub fn from_config(storage: S, config: &StorageConfig) -> Self {
        let mut store = Self::new(storage).with_storage_key(config.key.clone());
        store.load();
        store
    }
}

impl<S: SlotStorage, C: Clock> NoteStore<S, C> {
    /// Creates an empty store with an injected clock.
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            notes: Vec::new(),
        }
    }

    /// Creates a store with an injected clock and loads the default slot.
    pub fn open_with_clock(storage: S, clock: C) -> Self {
        let mut store = Self::with_clock(storage, clock);
        store.load();
        store
    }

    /// Retargets the store to another slot. Does not reload.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read-only view of the collection in stored order (newest insert first).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Looks up one note by id.
    pub fn get(&self, id: impl AsRef<str>) -> Option<&Note> {
        let id = id.as_ref();
        self.notes.iter().find(|note| note.id.as_str() == id)
    }

    /// Replaces the collection with the slot contents.
    ///
    /// A missing slot keeps the current collection. An unreadable or
    /// malformed slot resets it to empty. Duplicate ids in the slot keep
    /// their first occurrence.
    pub fn load(&mut self) -> LoadOutcome {
        let started_at = Instant::now();
        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=store_load module=store status=missing key={}",
                    self.storage_key
                );
                return LoadOutcome::Missing;
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=storage_read_failed key={} error={}",
                    self.storage_key, err
                );
                self.notes.clear();
                return LoadOutcome::Reset;
            }
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => {
                self.notes = dedupe_ids(notes);
                info!(
                    "event=store_load module=store status=ok key={} count={} duration_ms={}",
                    self.storage_key,
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                LoadOutcome::Loaded(self.notes.len())
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=slot_malformed key={} bytes={} error={}",
                    self.storage_key,
                    raw.len(),
                    err
                );
                self.notes.clear();
                LoadOutcome::Reset
            }
        }
    }

    /// Writes the whole collection to the slot.
    ///
    /// Mutations call this and ignore the result; it is public so callers
    /// that care about durability can retry or report.
    pub fn save(&mut self) -> StoreResult<()> {
        let result = serde_json::to_string(&self.notes)
            .map_err(StoreError::from)
            .and_then(|payload| {
                self.storage
                    .set(&self.storage_key, &payload)
                    .map(|()| payload.len())
                    .map_err(StoreError::from)
            });

        match result {
            Ok(bytes) => {
                debug!(
                    "event=store_save module=store status=ok key={} count={} bytes={}",
                    self.storage_key,
                    self.notes.len(),
                    bytes
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error error_code=storage_write_failed key={} count={} error={}",
                    self.storage_key,
                    self.notes.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Creates a note at the front of the collection and saves.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        options: NoteOptions,
    ) -> Note {
        let now = self.clock.now();
        let id = self.fresh_id(now);
        let note = Note::new(id, title, content, now).with_options(options);
        self.notes.insert(0, note.clone());
        info!(
            "event=note_add module=store status=ok note_id={} count={}",
            note.id,
            self.notes.len()
        );
        self.persist();
        note
    }

    /// Merges `patch` into the note with `id` and saves.
    ///
    /// Returns `None` without side effects when the id is unknown.
    /// `updated_at` is refreshed even for an empty patch.
    pub fn update(&mut self, id: impl AsRef<str>, patch: NotePatch) -> Option<Note> {
        let id = id.as_ref();
        let now = self.clock.now();
        let Some(note) = self.notes.iter_mut().find(|note| note.id.as_str() == id) else {
            debug!("event=note_update module=store status=not_found note_id={id}");
            return None;
        };

        let empty_patch = patch.is_empty();
        note.apply_patch(patch, now);
        let updated = note.clone();
        info!("event=note_update module=store status=ok note_id={id} empty_patch={empty_patch}");
        self.persist();
        Some(updated)
    }

    /// Removes the note with `id`. Saves only when something was removed.
    pub fn delete(&mut self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        let Some(index) = self.notes.iter().position(|note| note.id.as_str() == id) else {
            debug!("event=note_delete module=store status=not_found note_id={id}");
            return false;
        };

        self.notes.remove(index);
        info!(
            "event=note_delete module=store status=ok note_id={id} count={}",
            self.notes.len()
        );
        self.persist();
        true
    }

    /// Flips `completed` on the note with `id`. No-op for unknown ids.
    pub fn toggle(&mut self, id: impl AsRef<str>) -> Option<Note> {
        let completed = self.get(id.as_ref())?.completed;
        self.update(id, NotePatch::default().completed(!completed))
    }

    /// Filtered and sorted copy of the collection.
    pub fn filtered_and_sorted(
        &self,
        category: NoteCategory,
        sort: SortOption,
        tag_filter: Option<&str>,
    ) -> Vec<Note> {
        self.query(&NoteQuery::new(category, sort, tag_filter))
    }

    pub fn query(&self, query: &NoteQuery) -> Vec<Note> {
        query.apply(&self.notes)
    }

    /// Distinct tags across all notes, sorted by UTF-16 code unit
    /// (case-sensitive, so `"B"` sorts before `"a"`).
    ///
    /// UTF-16 order differs from code-point order only between supplementary
    /// characters and `U+E000..=U+FFFF`; it matches tag lists produced by the
    /// browser build.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .notes
            .iter()
            .filter_map(|note| note.tags.as_deref())
            .flatten()
            .map(String::as_str)
            .collect::<HashSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        tags.sort_by(|left, right| left.encode_utf16().cmp(right.encode_utf16()));
        tags
    }

    pub fn stats(&self) -> NoteStats {
        let completed = self.notes.iter().filter(|note| note.completed).count();
        NoteStats {
            total: self.notes.len(),
            active: self.notes.len() - completed,
            completed,
        }
    }

    fn persist(&mut self) {
        // Already logged by `save`; the mutation stands regardless.
        let _ = self.save();
    }

    fn fresh_id(&self, now: DateTime<Utc>) -> NoteId {
        loop {
            let candidate = NoteId::generate(now);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            warn!("event=note_add module=store status=retry reason=id_collision");
        }
    }
}

fn dedupe_ids(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::with_capacity(notes.len());
    let total = notes.len();
    let unique: Vec<Note> = notes
        .into_iter()
        .filter(|note| seen.insert(note.id.clone()))
        .collect();
    if unique.len() != total {
        warn!(
            "event=store_load module=store status=dedupe dropped={}",
            total - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn load_keeps_first_of_duplicate_ids() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[
                    {"id":"x","title":"first","content":"","completed":false,
                     "createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"},
                    {"id":"x","title":"second","content":"","completed":true,
                     "createdAt":"2024-01-02T00:00:00.000Z","updatedAt":"2024-01-02T00:00:00.000Z"}
                ]"#,
            )
            .unwrap();

        let store = NoteStore::open(storage);
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].title, "first");
    }

    #[test]
    fn missing_slot_leaves_existing_notes() {
        let mut store = NoteStore::new(MemoryStorage::new()).with_storage_key("elsewhere");
        store.add("kept", "", NoteOptions::default());
        store = store.with_storage_key("never-written");

        assert_eq!(store.load(), LoadOutcome::Missing);
        assert_eq!(store.notes().len(), 1);
    }
}
