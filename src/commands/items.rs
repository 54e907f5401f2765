//! Item list commands
//!
//! Handlers for `add`, `list`, `update`, `delete`, `clear`, `total` and
//! `user`. Items are addressed by full id or by a unique id prefix, the
//! same short form `list` prints.

use crate::error::{Result, ShopTallyError};
use crate::formatting::{format_currency, format_date_time_str};
use crate::manager::{ItemManager, ItemUpdate};
use crate::reports::ReportArchive;
use crate::storage::{Item, KeyValueStore};
use crate::validation::{validate_item_name, validate_price};
use colored::Colorize;
use prettytable::{format, Table};

/// Number of id characters shown in tables
pub const SHORT_ID_LEN: usize = 8;

const MAX_NAME_COLUMN: usize = 40;

/// Find the item whose id equals `query` or uniquely starts with it
///
/// # Errors
///
/// [`ShopTallyError::ItemNotFound`] when nothing matches and
/// [`ShopTallyError::AmbiguousId`] when several ids share the prefix.
pub fn resolve_id(items: &[Item], query: &str) -> std::result::Result<String, ShopTallyError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ShopTallyError::ItemNotFound(query.to_string()));
    }

    if let Some(item) = items.iter().find(|item| item.id == query) {
        return Ok(item.id.clone());
    }

    let mut matches = items.iter().filter(|item| item.id.starts_with(query));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item.id.clone()),
        (Some(_), Some(_)) => Err(ShopTallyError::AmbiguousId(query.to_string())),
        (None, _) => Err(ShopTallyError::ItemNotFound(query.to_string())),
    }
}

/// First [`SHORT_ID_LEN`] characters of an id
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_COLUMN {
        let head: String = name.chars().take(MAX_NAME_COLUMN - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Render an amount, falling back to the raw number
fn currency(amount: f64) -> String {
    format_currency(amount).unwrap_or_else(|_| amount.to_string())
}

/// Add an item to the current list
pub fn add_item<S: KeyValueStore>(manager: &mut ItemManager<S>, name: &str, price: &str) -> Result<()> {
    validate_item_name(name).map_err(ShopTallyError::from)?;
    validate_price(price).map_err(ShopTallyError::from)?;

    let item = manager
        .add_item(name, price)
        .ok_or_else(|| anyhow::anyhow!("Item was not added"))?;

    println!(
        "{} {} {} ({})",
        "Added".green(),
        item.name.bold(),
        currency(item.price),
        short_id(&item.id).cyan()
    );
    Ok(())
}

/// Print the current list as a table or as JSON
pub fn list_items<S: KeyValueStore>(manager: &ItemManager<S>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(manager.items())?);
        return Ok(());
    }

    if manager.is_empty() {
        println!("{}", "No items in the current list.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Item".bold(),
        "Price".bold(),
        "Added".bold()
    ]);

    for (index, item) in manager.items().iter().enumerate() {
        let added = format_date_time_str(&item.created_at)
            .unwrap_or_else(|_| item.created_at.clone());
        table.add_row(prettytable::row![
            index + 1,
            short_id(&item.id).cyan(),
            truncate_name(&item.name),
            r->currency(item.price),
            added
        ]);
    }

    println!("\nShopping list:");
    table.printstd();
    println!();
    print_total(manager);
    Ok(())
}

/// Change the name and/or price of an item
pub fn update_item<S: KeyValueStore>(
    manager: &mut ItemManager<S>,
    id: &str,
    name: Option<&str>,
    price: Option<&str>,
) -> Result<()> {
    if name.is_none() && price.is_none() {
        anyhow::bail!("Nothing to update; pass --name and/or --price");
    }

    let id = resolve_id(manager.items(), id)?;

    let mut update = ItemUpdate::new();
    if let Some(name) = name {
        validate_item_name(name).map_err(ShopTallyError::from)?;
        update = update.name(name);
    }
    if let Some(price) = price {
        validate_price(price).map_err(ShopTallyError::from)?;
        update = update.price(price);
    }

    if !manager.update_item(&id, update) {
        return Err(ShopTallyError::ItemNotFound(id).into());
    }

    if let Some(item) = manager.get(&id) {
        println!(
            "{} {} {} ({})",
            "Updated".green(),
            item.name.bold(),
            currency(item.price),
            short_id(&item.id).cyan()
        );
    }
    Ok(())
}

/// Delete an item
pub fn delete_item<S: KeyValueStore>(manager: &mut ItemManager<S>, id: &str) -> Result<()> {
    let id = resolve_id(manager.items(), id)?;
    let name = manager
        .get(&id)
        .map(|item| item.name.clone())
        .unwrap_or_default();

    if !manager.delete_item(&id) {
        return Err(ShopTallyError::ItemNotFound(id).into());
    }

    println!("{} {}", "Deleted".green(), name.bold());
    Ok(())
}

/// Remove every item from the current list
pub fn clear_items<S: KeyValueStore>(manager: &mut ItemManager<S>) -> Result<()> {
    let count = manager.len();
    manager.clear_all();
    println!("{}", format!("Cleared {} item(s)", count).green());
    Ok(())
}

fn print_total<S: KeyValueStore>(manager: &ItemManager<S>) {
    println!(
        "{} {} ({} item(s))",
        "Total:".bold(),
        currency(manager.calculate_total()).green(),
        manager.len()
    );
}

/// Print the running total
pub fn show_total<S: KeyValueStore>(manager: &ItemManager<S>) -> Result<()> {
    print_total(manager);
    Ok(())
}

/// Show the report user name, or set it when `name` is given
pub fn handle_user<S: KeyValueStore>(archive: &ReportArchive<S>, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let saved = archive.set_user_name(name)?;
            println!("{} {}", "User name set to".green(), saved.bold());
        }
        None => println!("{}", archive.user_name()),
    }
    Ok(())
}
