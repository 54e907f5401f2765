/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `items`: Item list commands (`add`, `list`, `update`, `delete`, `clear`, `total`, `user`)
- `report`: Saved report commands (`report save|list|delete|clear`)

Handlers print to stdout and return errors for the entrypoint to report.
*/

pub mod items;
pub mod report;

use crate::cli::Commands;
use crate::config::Config;
use crate::error::Result;
use crate::manager::ItemManager;
use crate::reports::ReportArchive;
use crate::storage::{KeyValueStore, StorageService};

/// Run one CLI command against `store`
///
/// The item list and the report archive share the same store.
pub async fn dispatch<S>(command: Commands, store: S, config: &Config) -> Result<()>
where
    S: KeyValueStore + Clone,
{
    let storage = StorageService::new(store.clone());
    if !storage.is_available() {
        tracing::warn!("Storage is unavailable; changes will not be saved");
    }

    let mut manager = ItemManager::new(storage);
    let archive = ReportArchive::new(store);

    match command {
        Commands::Add { name, price } => items::add_item(&mut manager, &name, &price),
        Commands::List { json } => items::list_items(&manager, json),
        Commands::Update { id, name, price } => {
            items::update_item(&mut manager, &id, name.as_deref(), price.as_deref())
        }
        Commands::Delete { id } => items::delete_item(&mut manager, &id),
        Commands::Clear => items::clear_items(&mut manager),
        Commands::Total => items::show_total(&manager),
        Commands::User { name } => items::handle_user(&archive, name.as_deref()),
        Commands::Report { command } => {
            report::handle_report(command, &mut manager, &archive, &config.report).await
        }
    }
}
