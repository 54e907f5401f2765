//! In-memory item list with validation and persistence
//!
//! [`ItemManager`] owns the authoritative list for one session. It loads
//! from storage once when created and writes the full list back after
//! every successful mutation. Persistence failures are logged; they never
//! undo a mutation that already happened in memory.

use crate::storage::{now_iso8601, Item, KeyValueStore, Outcome, StorageService};
use crate::validation::{validate_item_name, validate_price, PriceInput};
use uuid::Uuid;

/// Partial update for an existing item
///
/// Only the supplied fields are validated and applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemUpdate<'a> {
    /// New name; trimmed before it is stored
    pub name: Option<&'a str>,
    /// New price; the parsed value is stored
    pub price: Option<PriceInput<'a>>,
}

impl<'a> ItemUpdate<'a> {
    /// An update that changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new name
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    /// Set the new price
    pub fn price(mut self, price: impl Into<PriceInput<'a>>) -> Self {
        self.price = Some(price.into());
        self
    }
}

/// Owner of the shopping list for the current session
pub struct ItemManager<S> {
    storage: StorageService<S>,
    items: Vec<Item>,
}

impl<S: KeyValueStore> ItemManager<S> {
    /// Create a manager and load any previously saved items
    ///
    /// Storage failures at this point are logged and the manager starts
    /// with an empty list.
    pub fn new(storage: StorageService<S>) -> Self {
        let items = match storage.get_items() {
            Ok(Outcome::Ok(items)) => items,
            Ok(Outcome::Degraded { value, reason }) => {
                tracing::warn!(%reason, "Loaded items in degraded mode");
                value
            }
            Err(e) => {
                tracing::error!(
                    code = %e.code,
                    details = e.details.as_deref().unwrap_or(""),
                    "Failed to load items from storage"
                );
                Vec::new()
            }
        };

        tracing::debug!(count = items.len(), "Item manager initialized");
        Self { storage, items }
    }

    /// Current items in insertion order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The storage service backing this manager
    pub fn storage(&self) -> &StorageService<S> {
        &self.storage
    }

    /// Add a new item
    ///
    /// Returns `None` without touching the list when the name or price is
    /// invalid. Otherwise the trimmed name, parsed price, a fresh id, and
    /// the current time are recorded and the created item is returned.
    pub fn add_item<'a>(&mut self, name: &str, price: impl Into<PriceInput<'a>>) -> Option<Item> {
        if let Err(e) = validate_item_name(name) {
            tracing::debug!(error = %e, "Rejected item name");
            return None;
        }

        let price = match validate_price(price) {
            Ok(price) => price,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected item price");
                return None;
            }
        };

        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            price,
            created_at: now_iso8601(),
        };

        self.items.push(item.clone());
        tracing::info!(id = %item.id, name = %item.name, price = item.price, "Added item");
        self.persist();
        Some(item)
    }

    /// Apply a partial update to the item with `id`
    ///
    /// Returns `false` without mutating when the id is unknown or any
    /// supplied field fails validation.
    pub fn update_item(&mut self, id: &str, update: ItemUpdate<'_>) -> bool {
        let name = match update.name {
            Some(name) => match validate_item_name(name) {
                Ok(()) => Some(name.trim().to_string()),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected updated name");
                    return false;
                }
            },
            None => None,
        };

        let price = match update.price {
            Some(price) => match validate_price(price) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected updated price");
                    return false;
                }
            },
            None => None,
        };

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            tracing::debug!(id, "Update for unknown item");
            return false;
        };

        if let Some(name) = name {
            item.name = name;
        }
        if let Some(price) = price {
            item.price = price;
        }

        tracing::info!(id, "Updated item");
        self.persist();
        true
    }

    /// Remove the item with `id`; `false` when no such item exists
    pub fn delete_item(&mut self, id: &str) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };

        self.items.remove(index);
        tracing::info!(id, "Deleted item");
        self.persist();
        true
    }

    /// Empty the list and clear stored data
    ///
    /// Clear failures are logged; the in-memory list is emptied regardless.
    pub fn clear_all(&mut self) {
        self.items.clear();

        match self.storage.clear_items() {
            Ok(Outcome::Ok(())) => {}
            Ok(Outcome::Degraded { reason, .. }) => {
                tracing::debug!(%reason, "Storage clear skipped");
            }
            Err(e) => {
                tracing::error!(code = %e.code, "Failed to clear storage");
            }
        }

        tracing::info!("Cleared all items");
        self.persist();
    }

    /// Sum of all item prices; 0 for an empty list
    pub fn calculate_total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save_items(&self.items) {
            tracing::error!(
                code = %e.code,
                details = e.details.as_deref().unwrap_or(""),
                "Failed to save items to storage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ITEMS_KEY};
    use crate::test_utils::{sample_item, FlakyStore};
    use chrono::DateTime;

    fn manager() -> ItemManager<MemoryStore> {
        ItemManager::new(StorageService::new(MemoryStore::new()))
    }

    fn stored_items<S: KeyValueStore>(manager: &ItemManager<S>) -> Vec<Item> {
        manager.storage().get_items().unwrap().into_value()
    }

    #[test]
    fn test_loads_saved_items_on_init() {
        let storage = StorageService::new(MemoryStore::new());
        let items = vec![sample_item("1", "Cà chua", 20000.0)];
        storage.save_items(&items).unwrap();

        let manager = ItemManager::new(storage);
        assert_eq!(manager.items(), items.as_slice());
    }

    #[test]
    fn test_starts_empty_when_stored_data_is_corrupt() {
        let store = MemoryStore::new();
        store.set(ITEMS_KEY, "not json at all").unwrap();

        let manager = ItemManager::new(StorageService::new(store));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_starts_empty_when_reads_fail() {
        let store = FlakyStore::new().fail_reads();
        store
            .inner()
            .set(
                ITEMS_KEY,
                r#"{"items":[{"id":"1","name":"Rau","price":1000,"createdAt":"2024-01-01T00:00:00.000Z"}]}"#,
            )
            .unwrap();

        let manager = ItemManager::new(StorageService::new(store));
        assert!(manager.is_empty());
        assert_eq!(manager.calculate_total(), 0.0);
    }

    #[test]
    fn test_starts_empty_when_storage_unavailable() {
        let manager = ItemManager::new(StorageService::new(FlakyStore::unavailable()));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_add_valid_item() {
        let mut manager = manager();
        let item = manager.add_item("Cà chua", 20000.0).expect("item added");

        assert_eq!(item.name, "Cà chua");
        assert_eq!(item.price, 20000.0);
        assert!(!item.id.is_empty());
        assert!(DateTime::parse_from_rfc3339(&item.created_at).is_ok());
        assert_eq!(manager.calculate_total(), 20000.0);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_add_trims_name_and_parses_price_text() {
        let mut manager = manager();
        let item = manager.add_item("  Thịt heo  ", "150000").unwrap();
        assert_eq!(item.name, "Thịt heo");
        assert_eq!(item.price, 150000.0);
    }

    #[test]
    fn test_add_generates_unique_ids() {
        let mut manager = manager();
        let a = manager.add_item("A", 1.0).unwrap();
        let b = manager.add_item("B", 2.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_add_rejects_negative_price() {
        let mut manager = manager();
        manager.add_item("Rau", 5000.0).unwrap();

        assert!(manager.add_item("Cà chua", -100.0).is_none());
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.calculate_total(), 5000.0);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut manager = manager();
        assert!(manager.add_item("   ", 1000.0).is_none());
        assert!(manager.add_item("", 1000.0).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_add_persists_list() {
        let mut manager = manager();
        let item = manager.add_item("Cà chua", 20000.0).unwrap();
        assert_eq!(stored_items(&manager), vec![item]);
    }

    #[test]
    fn test_add_survives_save_failure() {
        let store = FlakyStore::new().quota_on(ITEMS_KEY);
        let mut manager = ItemManager::new(StorageService::new(store));

        let item = manager.add_item("Cà chua", 20000.0);
        assert!(item.is_some());
        assert_eq!(manager.len(), 1);
        let raw = manager.storage().store().inner().get(ITEMS_KEY).unwrap();
        assert_eq!(raw, None);
    }

    #[test]
    fn test_update_name_and_price() {
        let mut manager = manager();
        let item = manager.add_item("Cà chua", 20000.0).unwrap();

        let update = ItemUpdate::new().name("  Cà rốt ").price(25000.0);
        assert!(manager.update_item(&item.id, update));

        let stored = manager.get(&item.id).unwrap();
        assert_eq!(stored.name, "Cà rốt");
        assert_eq!(stored.price, 25000.0);
        assert_eq!(stored.created_at, item.created_at);
        assert_eq!(stored_items(&manager)[0].name, "Cà rốt");
    }

    #[test]
    fn test_update_only_price_keeps_name() {
        let mut manager = manager();
        let item = manager.add_item("Cà chua", 20000.0).unwrap();

        assert!(manager.update_item(&item.id, ItemUpdate::new().price("30000")));
        let stored = manager.get(&item.id).unwrap();
        assert_eq!(stored.name, "Cà chua");
        assert_eq!(stored.price, 30000.0);
    }

    #[test]
    fn test_update_rejects_invalid_fields_without_mutation() {
        let mut manager = manager();
        let item = manager.add_item("Cà chua", 20000.0).unwrap();

        assert!(!manager.update_item(&item.id, ItemUpdate::new().name("  ")));
        assert!(!manager.update_item(
            &item.id,
            ItemUpdate::new().name("Valid").price(0.0)
        ));
        assert_eq!(manager.get(&item.id), Some(&item));
    }

    #[test]
    fn test_update_unknown_id_returns_false() {
        let mut manager = manager();
        manager.add_item("Cà chua", 20000.0).unwrap();
        assert!(!manager.update_item("missing", ItemUpdate::new().name("X")));
    }

    #[test]
    fn test_delete_existing_item() {
        let mut manager = manager();
        let a = manager.add_item("A", 1000.0).unwrap();
        let b = manager.add_item("B", 2000.0).unwrap();

        assert!(manager.delete_item(&a.id));
        assert_eq!(manager.items(), &[b.clone()]);
        assert_eq!(manager.calculate_total(), 2000.0);
        assert_eq!(stored_items(&manager), vec![b]);
    }

    #[test]
    fn test_delete_unknown_item_returns_false() {
        let mut manager = manager();
        assert!(!manager.delete_item("missing"));
    }

    #[test]
    fn test_delete_last_item_leaves_empty_list() {
        let mut manager = manager();
        let item = manager.add_item("A", 1000.0).unwrap();
        assert!(manager.delete_item(&item.id));
        assert!(manager.is_empty());
        assert_eq!(manager.calculate_total(), 0.0);
    }

    #[test]
    fn test_clear_all_empties_memory_and_storage() {
        let mut manager = manager();
        manager.add_item("A", 1000.0).unwrap();
        manager.add_item("B", 2000.0).unwrap();

        manager.clear_all();
        assert!(manager.is_empty());
        assert!(stored_items(&manager).is_empty());
    }

    #[test]
    fn test_clear_all_swallows_storage_errors() {
        let store = FlakyStore::new().fail_removes();
        let mut manager = ItemManager::new(StorageService::new(store));
        manager.add_item("A", 1000.0).unwrap();

        manager.clear_all();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_total_of_empty_list_is_zero() {
        assert_eq!(manager().calculate_total(), 0.0);
    }

    #[test]
    fn test_total_sums_all_prices() {
        let mut manager = manager();
        manager.add_item("A", 20000.0).unwrap();
        manager.add_item("B", 150000.0).unwrap();
        manager.add_item("C", 5500.5).unwrap();
        assert_eq!(manager.calculate_total(), 175500.5);
    }
}
