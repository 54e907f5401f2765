//! Validation rules for item names, prices, and item lists
//!
//! All functions are pure. Failures are returned as [`ValidationError`]
//! values so callers can render them next to the offending field.

use crate::error::{ValidationError, MAX_NAME_LENGTH};
use crate::storage::Item;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Prices must be strictly below this value
pub const PRICE_LIMIT: f64 = 1_000_000_000.0;

/// Raw price as it arrives from a form field or from code
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceInput<'a> {
    /// No value supplied
    Missing,
    /// Already numeric
    Number(f64),
    /// Text to be parsed
    Text(&'a str),
}

impl From<f64> for PriceInput<'_> {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<i64> for PriceInput<'_> {
    fn from(value: i64) -> Self {
        PriceInput::Number(value as f64)
    }
}

impl From<i32> for PriceInput<'_> {
    fn from(value: i32) -> Self {
        PriceInput::Number(f64::from(value))
    }
}

impl<'a> From<&'a str> for PriceInput<'a> {
    fn from(value: &'a str) -> Self {
        PriceInput::Text(value)
    }
}

impl<'a> From<&'a String> for PriceInput<'a> {
    fn from(value: &'a String) -> Self {
        PriceInput::Text(value.as_str())
    }
}

impl<'a, T: Into<PriceInput<'a>>> From<Option<T>> for PriceInput<'a> {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PriceInput::Missing)
    }
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("numeric prefix pattern is valid")
    })
}

/// Parse the longest numeric prefix of `text`
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"12abc"`
/// parses as 12. Returns NaN when no numeric prefix exists.
pub fn parse_price_text(text: &str) -> f64 {
    let text = text.trim_start();
    numeric_prefix()
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Validate an item name
///
/// Fails with `EMPTY_NAME` when the name is absent or blank after trimming
/// and with `NAME_TOO_LONG` when the trimmed name exceeds 200 UTF-16 code
/// units.
/// The caller's value is not trimmed.
///
/// # Examples
///
/// ```
/// use shoptally::validation::validate_item_name;
///
/// assert!(validate_item_name("Cà chua").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// assert!(validate_item_name(None::<&str>).is_err());
/// ```
pub fn validate_item_name<'a>(name: impl Into<Option<&'a str>>) -> Result<(), ValidationError> {
    let trimmed = name.into().map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    if trimmed.encode_utf16().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validate a price and return its parsed value
///
/// # Examples
///
/// ```
/// use shoptally::validation::validate_price;
///
/// assert_eq!(validate_price("20000").unwrap(), 20000.0);
/// assert_eq!(validate_price(999_999_999.0).unwrap(), 999_999_999.0);
/// assert!(validate_price(1_000_000_000.0).is_err());
/// ```
pub fn validate_price<'a>(price: impl Into<PriceInput<'a>>) -> Result<f64, ValidationError> {
    let value = match price.into() {
        PriceInput::Missing => return Err(ValidationError::EmptyPrice),
        PriceInput::Text(text) if text.is_empty() => return Err(ValidationError::EmptyPrice),
        PriceInput::Text(text) => parse_price_text(text),
        PriceInput::Number(value) => value,
    };

    if value.is_nan() {
        return Err(ValidationError::NotANumber);
    }

    if value <= 0.0 {
        return Err(ValidationError::NotPositive);
    }

    if value >= PRICE_LIMIT {
        return Err(ValidationError::TooLarge);
    }

    Ok(value)
}

/// Validate a list of items before it is finalized
///
/// The first failing item wins; its 1-based position is carried in the
/// error. Id uniqueness is checked across the whole list after the
/// per-item checks pass.
pub fn validate_item_list(items: &[Item]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyList);
    }

    for (index, item) in items.iter().enumerate() {
        let position = index + 1;

        if item.id.is_empty() {
            return Err(ValidationError::MissingId { position });
        }

        let invalid = |reason| ValidationError::InvalidItem {
            position,
            reason: Box::new(reason),
        };
        validate_item_name(item.name.as_str()).map_err(invalid)?;
        validate_price(item.price).map_err(invalid)?;
    }

    let mut seen = HashSet::with_capacity(items.len());
    if !items.iter().all(|item| seen.insert(item.id.as_str())) {
        return Err(ValidationError::DuplicateId);
    }

    Ok(())
}
