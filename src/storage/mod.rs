//! Persistence of the shopping session
//!
//! [`StorageService`] serializes the session record into an injected
//! [`KeyValueStore`]. Every call first probes the store with a throwaway
//! write and delete. Best-effort operations return an [`Outcome`] that is
//! either `Ok` or `Degraded`; critical operations return
//! `Result<_, StorageError>` so the failure cannot be ignored silently.
//!
//! Corrupt data policy: a blob that is not valid JSON is deleted and reported
//! as `CORRUPT_DATA`. A blob that parses but has no `items` array of valid
//! items is deleted and read back as an empty list without an error.

use crate::error::{StorageError, StorageErrorCode};
use serde_json::Value;
use std::fmt;

pub mod backend;
pub mod sqlite;
pub mod types;

pub use backend::{KeyValueStore, MemoryStore};
pub use sqlite::SqliteStore;
pub use types::{now_iso8601, Item, SessionRecord};

use types::SessionRecordRef;

/// Key holding the serialized session record
pub const ITEMS_KEY: &str = "shopping_items";
/// Key holding the bare ISO 8601 session start time
pub const SESSION_TIME_KEY: &str = "shopping_session_time";
/// Throwaway key used by the availability probe
pub const PROBE_KEY: &str = "__storage_test__";

/// Why a best-effort operation fell back to a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// The availability probe failed
    Unavailable,
    /// Stored record parsed but had no usable `items` array; it was discarded
    InvalidShape,
    /// The backend failed on an otherwise available store
    StoreFailure(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Unavailable => f.write_str("storage unavailable"),
            DegradeReason::InvalidShape => f.write_str("invalid session data discarded"),
            DegradeReason::StoreFailure(msg) => write!(f, "store failure: {}", msg),
        }
    }
}

/// Result of a best-effort storage operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation did what was asked
    Ok(T),
    /// The operation fell back to `value`
    Degraded {
        /// Fallback value
        value: T,
        /// Why the fallback was used
        reason: DegradeReason,
    },
}

impl<T> Outcome<T> {
    fn degraded(value: T, reason: DegradeReason) -> Self {
        Outcome::Degraded { value, reason }
    }

    /// Borrow the value regardless of degradation
    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    /// Take the value regardless of degradation
    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    /// Whether a fallback was used
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// The degradation reason, if any
    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

enum Decoded {
    Items(Vec<Item>),
    InvalidShape,
    Malformed(String),
}

fn decode_session(raw: &str) -> Decoded {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Decoded::Malformed(e.to_string()),
    };

    match value {
        Value::Null => Decoded::Malformed("session record is null".to_string()),
        Value::Object(mut map) => match map.remove("items") {
            Some(items @ Value::Array(_)) => match serde_json::from_value(items) {
                Ok(items) => Decoded::Items(items),
                Err(e) => {
                    tracing::debug!(error = %e, "Stored item does not decode");
                    Decoded::InvalidShape
                }
            },
            _ => Decoded::InvalidShape,
        },
        _ => Decoded::InvalidShape,
    }
}

/// Session persistence over a [`KeyValueStore`]
pub struct StorageService<S> {
    store: S,
}

impl<S: KeyValueStore> StorageService<S> {
    /// Wrap a key-value store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Probe the store with a throwaway write and delete
    pub fn is_available(&self) -> bool {
        match self
            .store
            .set(PROBE_KEY, "test")
            .and_then(|_| self.store.remove(PROBE_KEY))
        {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Storage availability probe failed");
                false
            }
        }
    }

    /// Persist the full item list
    ///
    /// The stored start time is reused when present; otherwise a new one is
    /// stamped and, once the items are written, remembered so later saves
    /// keep it.
    ///
    /// # Errors
    ///
    /// `STORAGE_UNAVAILABLE` when the probe fails, `STORAGE_FULL` on a quota
    /// error, `STORAGE_WRITE_FAILED` for any other failure.
    pub fn save_items(&self, items: &[Item]) -> Result<(), StorageError> {
        if !self.is_available() {
            return Err(StorageError::new(
                StorageErrorCode::StorageUnavailable,
                "Storage is not available",
            ));
        }

        let now = now_iso8601();
        let stored_start = self.get_session_time().into_value();
        let start_time = stored_start.clone().unwrap_or_else(|| now.clone());

        let record = SessionRecordRef {
            items,
            start_time: &start_time,
            last_modified: &now,
        };
        let serialized = serde_json::to_string(&record).map_err(|e| {
            StorageError::new(StorageErrorCode::StorageWriteFailed, e.to_string())
        })?;

        self.store
            .set(ITEMS_KEY, &serialized)
            .map_err(StorageError::from_write)?;

        if stored_start.is_none() {
            self.save_session_time(&start_time);
        }

        tracing::debug!(count = items.len(), "Saved items");
        Ok(())
    }

    /// Load the item list
    ///
    /// Returns an empty list (degraded) when the store is unavailable and an
    /// empty list when nothing is stored. A record without an `items` array,
    /// or with an element that is not an item, is discarded and read as
    /// empty.
    ///
    /// # Errors
    ///
    /// `CORRUPT_DATA` when the stored blob cannot be parsed; the blob is
    /// deleted before returning.
    pub fn get_items(&self) -> Result<Outcome<Vec<Item>>, StorageError> {
        if !self.is_available() {
            return Ok(Outcome::degraded(Vec::new(), DegradeReason::Unavailable));
        }

        let raw = match self.store.get(ITEMS_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Ok(Outcome::Ok(Vec::new())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read items from storage");
                return Ok(Outcome::degraded(
                    Vec::new(),
                    DegradeReason::StoreFailure(e.to_string()),
                ));
            }
        };

        match decode_session(&raw) {
            Decoded::Items(items) => Ok(Outcome::Ok(items)),
            Decoded::InvalidShape => {
                tracing::warn!("Invalid session data, clearing storage");
                self.discard_stored();
                Ok(Outcome::degraded(Vec::new(), DegradeReason::InvalidShape))
            }
            Decoded::Malformed(details) => {
                tracing::error!(%details, "Failed to parse storage data");
                self.discard_stored();
                Err(StorageError::new(StorageErrorCode::CorruptData, details))
            }
        }
    }

    /// Remove the items blob and the session start time
    ///
    /// A no-op (degraded) when the store is unavailable. Clearing twice is
    /// safe.
    ///
    /// # Errors
    ///
    /// `STORAGE_CLEAR_FAILED` when a delete fails on an available store.
    pub fn clear_items(&self) -> Result<Outcome<()>, StorageError> {
        if !self.is_available() {
            return Ok(Outcome::degraded((), DegradeReason::Unavailable));
        }

        self.store
            .remove(ITEMS_KEY)
            .and_then(|_| self.store.remove(SESSION_TIME_KEY))
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to clear storage");
                StorageError::new(StorageErrorCode::StorageClearFailed, e.to_string())
            })?;

        Ok(Outcome::Ok(()))
    }

    /// Remember the session start time (best effort)
    pub fn save_session_time(&self, time: &str) -> Outcome<()> {
        if !self.is_available() {
            return Outcome::degraded((), DegradeReason::Unavailable);
        }

        match self.store.set(SESSION_TIME_KEY, time) {
            Ok(()) => Outcome::Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to save session time");
                Outcome::degraded((), DegradeReason::StoreFailure(e.to_string()))
            }
        }
    }

    /// Read the session start time (best effort)
    pub fn get_session_time(&self) -> Outcome<Option<String>> {
        if !self.is_available() {
            return Outcome::degraded(None, DegradeReason::Unavailable);
        }

        match self.store.get(SESSION_TIME_KEY) {
            Ok(time) => Outcome::Ok(time.filter(|t| !t.is_empty())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to get session time");
                Outcome::degraded(None, DegradeReason::StoreFailure(e.to_string()))
            }
        }
    }

    /// Read the full stored record, if any and if it decodes
    pub fn get_session(&self) -> Option<SessionRecord> {
        let raw = self.store.get(ITEMS_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    fn discard_stored(&self) {
        if let Err(e) = self.clear_items() {
            tracing::error!(error = %e, "Failed to discard corrupt session data");
        }
    }
}
