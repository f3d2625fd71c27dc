//! No-op slot storage for non-interactive contexts.

use super::{SlotStorage, StorageResult};

/// Storage that never holds data: reads miss, writes are discarded.
///
/// Stands in for durable storage where none exists, such as server-side
/// rendering or headless tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl SlotStorage for NullStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Ok(())
    }
}
