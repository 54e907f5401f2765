use shoptally::storage::{Item, SqliteStore};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store(quota_bytes: Option<u64>) -> (Rc<SqliteStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("shoptally.db");
    let store = SqliteStore::new_with_path(db_path, quota_bytes)
        .expect("failed to create sqlite store with path");
    (Rc::new(store), tmp)
}

#[allow(dead_code)]
pub fn reopen_store(tmp: &TempDir) -> Rc<SqliteStore> {
    Rc::new(
        SqliteStore::new_with_path(tmp.path().join("shoptally.db"), None)
            .expect("failed to reopen sqlite store"),
    )
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn item(id: &str, name: &str, price: f64) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        price,
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}
