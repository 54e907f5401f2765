//! ShopTally - shopping expense tracker library
//!
//! This library provides the core functionality for ShopTally: validating
//! items and prices, persisting the current list through a pluggable
//! key-value store, managing the list, and archiving finished lists as
//! reports.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `validation`: Name, price, and item-list validation
//! - `storage`: Session persistence over a `KeyValueStore` (SQLite or memory)
//! - `manager`: The in-memory list with best-effort persistence
//! - `reports`: Local report archive and the spreadsheet web app client
//! - `formatting`: Currency and date display
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use shoptally::{ItemManager, MemoryStore, StorageService};
//!
//! let mut manager = ItemManager::new(StorageService::new(MemoryStore::new()));
//! manager.add_item("Cà chua", 20000.0).unwrap();
//! manager.add_item("Thịt heo", "150000").unwrap();
//! assert_eq!(manager.calculate_total(), 170000.0);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatting;
pub mod manager;
pub mod reports;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{
    AppError, ErrorType, ReportError, Result, ShopTallyError, StorageError, StorageErrorCode,
    StoreError, ValidationError,
};
pub use manager::{ItemManager, ItemUpdate};
pub use reports::{finalize_report, ReportArchive, ReportClient, SavedReport};
pub use storage::{Item, KeyValueStore, MemoryStore, Outcome, SqliteStore, StorageService};

#[cfg(test)]
pub mod test_utils;
