use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A named, priced entry in the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v4 for items created here)
    pub id: String,
    /// Trimmed display name, 1 to 200 characters
    pub name: String,
    /// Price in VND, strictly between 0 and 1,000,000,000
    pub price: f64,
    /// Creation time (ISO 8601)
    pub created_at: String,
}

/// Persisted envelope wrapping the item list plus timing metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Items in insertion order
    pub items: Vec<Item>,
    /// When the session started; preserved across saves
    pub start_time: String,
    /// When the record was last written
    pub last_modified: String,
}

/// Borrowing twin of [`SessionRecord`] used on the write path
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionRecordRef<'a> {
    pub items: &'a [Item],
    pub start_time: &'a str,
    pub last_modified: &'a str,
}

/// Current time as an ISO 8601 string with millisecond precision
/// (`2024-01-01T00:00:00.000Z`)
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
