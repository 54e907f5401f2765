//! Test utilities for ShopTally
//!
//! Provides item fixtures and a key-value store whose failures can be
//! switched on per operation and per key.

use crate::error::StoreError;
use crate::storage::{Item, KeyValueStore, MemoryStore, PROBE_KEY};
use std::collections::HashSet;

/// Build an item with a fixed creation time
pub fn sample_item(id: &str, name: &str, price: f64) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        price,
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

/// In-memory store with injectable failures
///
/// # Examples
///
/// ```ignore
/// let store = FlakyStore::new().quota_on("shopping_items");
/// ```
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    unavailable: bool,
    quota_keys: HashSet<String>,
    failing_set_keys: HashSet<String>,
    fail_removes: bool,
    fail_reads: bool,
}

impl FlakyStore {
    /// A store with no failures
    pub fn new() -> Self {
        Self::default()
    }

    /// A store where every write fails, so the availability probe fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Writes to `key` fail with a quota error
    pub fn quota_on(mut self, key: &str) -> Self {
        self.quota_keys.insert(key.to_string());
        self
    }

    /// Writes to `key` fail with a generic backend error
    pub fn fail_set_on(mut self, key: &str) -> Self {
        self.failing_set_keys.insert(key.to_string());
        self
    }

    /// Deletes of anything but the probe key fail
    pub fn fail_removes(mut self) -> Self {
        self.fail_removes = true;
        self
    }

    /// Every read fails
    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Direct access to the backing map, bypassing injected failures
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Backend("read failed".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("storage disabled".to_string()));
        }
        if self.quota_keys.contains(key) {
            return Err(StoreError::QuotaExceeded { limit: 0 });
        }
        if self.failing_set_keys.contains(key) {
            return Err(StoreError::Backend("write failed".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_removes && key != PROBE_KEY {
            return Err(StoreError::Backend("remove failed".to_string()));
        }
        self.inner.remove(key)
    }
}
