//! Vietnamese display formatting for amounts and timestamps

use crate::error::FormatError;
use chrono::{DateTime, FixedOffset, TimeZone};
use std::fmt::Display;

/// Currency suffix appended to formatted amounts
pub const CURRENCY_SYMBOL: &str = "₫";

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Format an amount as Vietnamese currency
///
/// The integer part is grouped with dots; a fractional part, if any, is
/// kept after a comma.
///
/// # Examples
///
/// ```
/// use shoptally::formatting::format_currency;
///
/// assert_eq!(format_currency(1_000_000.0).unwrap(), "1.000.000 ₫");
/// assert_eq!(format_currency(0.0).unwrap(), "0 ₫");
/// ```
pub fn format_currency(amount: f64) -> Result<String, FormatError> {
    if !amount.is_finite() {
        return Err(FormatError::InvalidAmount);
    }
    if amount < 0.0 {
        return Err(FormatError::NegativeAmount);
    }

    let plain = amount.to_string();
    let formatted = match plain.split_once('.') {
        Some((int, frac)) => format!("{},{}", group_thousands(int), frac),
        None => group_thousands(&plain),
    };

    Ok(format!("{} {}", formatted, CURRENCY_SYMBOL))
}

/// Format a timestamp as `dd/mm/yyyy` in its own offset
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%d/%m/%Y").to_string()
}

/// Format a timestamp as `dd/mm/yyyy HH:MM` in its own offset
pub fn format_date_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%d/%m/%Y %H:%M").to_string()
}

fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, FormatError> {
    DateTime::parse_from_rfc3339(value).map_err(|_| FormatError::InvalidDate(value.to_string()))
}

/// [`format_date`] for an RFC 3339 string
pub fn format_date_str(value: &str) -> Result<String, FormatError> {
    parse_timestamp(value).map(|d| format_date(&d))
}

/// [`format_date_time`] for an RFC 3339 string
pub fn format_date_time_str(value: &str) -> Result<String, FormatError> {
    parse_timestamp(value).map(|d| format_date_time(&d))
}
