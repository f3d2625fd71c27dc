//! In-memory slot storage with an optional byte quota.

use super::{SlotStorage, StorageError, StorageResult};
use std::collections::HashMap;

/// Process-local slots. Contents vanish with the value.
///
/// The quota counts key and value bytes across all slots, the way browser
/// local storage accounts its per-origin limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that rejects writes growing past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently held, keys included.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    /// Raw slot access for inspection in tests and tooling.
    pub fn slot(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .slots
                .get(key)
                .map_or(0, |previous| key.len() + previous.len());
            let size = self.used_bytes() - replaced + key.len() + value.len();
            if size > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size,
                    quota,
                });
            }
        }

        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
