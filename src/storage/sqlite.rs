use crate::error::{Result, ShopTallyError, StoreError};
use crate::storage::backend::KeyValueStore;
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// File name of the database inside the application data directory
const DB_FILE_NAME: &str = "shoptally.db";

/// On-disk key-value store backed by a single SQLite table
///
/// Keys live in `kv(key TEXT PRIMARY KEY, value TEXT NOT NULL)`. An
/// optional byte quota over all keys and values emulates the capacity
/// limit of browser storage; writes beyond it fail with
/// [`StoreError::QuotaExceeded`].
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
    quota_bytes: Option<u64>,
}

impl SqliteStore {
    /// Default database location in the user's data directory
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "shoptally", "shoptally").ok_or_else(|| {
            ShopTallyError::Config("Could not determine data directory".into())
        })?;
        Ok(proj_dirs.data_dir().join(DB_FILE_NAME))
    }

    /// Open (or create) the store at `db_path`
    ///
    /// # Examples
    ///
    /// ```
    /// use shoptally::storage::SqliteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("s.db"), None).unwrap();
    /// assert!(store.db_path().ends_with("s.db"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P, quota_bytes: Option<u64>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")?;
            }
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        let store = Self {
            conn,
            db_path,
            quota_bytes,
        };
        store.init()?;
        Ok(store)
    }

    /// Path of the underlying database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )",
                [],
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    /// Bytes used by every entry except `key`
    fn usage_excluding(&self, key: &str) -> std::result::Result<u64, StoreError> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
            FROM kv WHERE key != ?",
            params![key],
            |row| row.get(0),
        )?;
        Ok(used.max(0) as u64)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        if let Some(limit) = self.quota_bytes {
            let needed = self.usage_excluding(key)? + (key.len() + value.len()) as u64;
            if needed > limit {
                tracing::debug!(key, needed, limit, "Rejecting write over quota");
                return Err(StoreError::QuotaExceeded { limit });
            }
        }

        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Helper: create a temporary store backed by a temp directory.
    ///
    /// Returns both the `SqliteStore` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_store(quota: Option<u64>) -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("shoptally.db");
        let store = SqliteStore::new_with_path(db_path, quota).expect("failed to create store");
        (store, dir)
    }

    #[test]
    fn test_init_creates_kv_table() {
        let (store, _dir) = create_test_store(None);
        let conn = Connection::open(store.db_path()).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='kv'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let (store, _dir) = create_test_store(None);
        store.set("shopping_items", "{\"items\":[]}").unwrap();
        assert_eq!(
            store.get("shopping_items").unwrap().as_deref(),
            Some("{\"items\":[]}")
        );
    }

    #[test]
    fn test_set_overwrites_existing_key() {
        let (store, _dir) = create_test_store(None);
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _dir) = create_test_store(None);
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store(None);
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_quota_exceeded_is_reported() {
        let (store, _dir) = create_test_store(Some(16));
        store.set("a", "small").unwrap();
        let err = store.set("b", "this value is far too long").unwrap_err();
        assert_eq!(err, StoreError::QuotaExceeded { limit: 16 });
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_quota_counts_utf8_bytes() {
        // "ạ" is three bytes in UTF-8
        let (store, _dir) = create_test_store(Some(4));
        assert!(store.set("k", "ạ").is_ok());
        assert!(matches!(
            store.set("k", "ạạ"),
            Err(StoreError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("shoptally.db");
        {
            let store = SqliteStore::new_with_path(&db_path, None).unwrap();
            store.set("userName", "Lan").unwrap();
        }
        let reopened = SqliteStore::new_with_path(&db_path, None).unwrap();
        assert_eq!(reopened.get("userName").unwrap().as_deref(), Some("Lan"));
    }
}
