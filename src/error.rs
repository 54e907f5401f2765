//! Error types for ShopTally
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Validation failures are returned as values so forms can render them
//! inline. Storage failures on critical paths are returned as
//! [`StorageError`]; best-effort paths degrade instead (see
//! [`crate::storage::Outcome`]).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Maximum accepted length of an item name, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// Application error category
///
/// Mirrors the categories a caller uses to decide how a failure is shown
/// to the user (inline field message, toast, or silently absorbed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Bad name, price, or list shape
    ValidationError,
    /// Could not reach the report service
    NetworkError,
    /// The report service answered with something unusable
    ApiError,
    /// Persistent store unavailable, full, corrupt, or failing
    StorageError,
    /// Anything else
    UnknownError,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::ValidationError => "VALIDATION_ERROR",
            ErrorType::NetworkError => "NETWORK_ERROR",
            ErrorType::ApiError => "API_ERROR",
            ErrorType::StorageError => "STORAGE_ERROR",
            ErrorType::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(s)
    }
}

/// Structured application error handed to the presentation layer
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct AppError {
    /// Error category
    #[serde(rename = "type")]
    pub kind: ErrorType,
    /// User-facing message
    pub message: String,
    /// Technical detail for logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Whether retrying the same operation may succeed
    pub retryable: bool,
}

/// Validation failure for an item name, price, or item list
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is absent or whitespace only
    #[error("Please enter an item name")]
    EmptyName,

    /// Trimmed name is longer than [`MAX_NAME_LENGTH`]
    #[error("Item name must not exceed {max} characters")]
    NameTooLong {
        /// The maximum allowed length
        max: usize,
    },

    /// Price is absent or an empty string
    #[error("Please enter a price")]
    EmptyPrice,

    /// Price could not be parsed as a number
    #[error("Price must be a number")]
    NotANumber,

    /// Price is zero or negative
    #[error("Price must be a positive number")]
    NotPositive,

    /// Price is one billion or more
    #[error("Price must be less than 1 billion VND")]
    TooLarge,

    /// Item list has no elements
    #[error("Please add at least one item")]
    EmptyList,

    /// Item at a 1-based position has no id
    #[error("Item {position} is missing an ID")]
    MissingId {
        /// 1-based position in the list
        position: usize,
    },

    /// Item at a 1-based position has an invalid name or price
    #[error("Item {position}: {reason}")]
    InvalidItem {
        /// 1-based position in the list
        position: usize,
        /// The name or price failure
        reason: Box<ValidationError>,
    },

    /// Two or more items share an id
    #[error("Some items share the same ID")]
    DuplicateId,

    /// Display name for reports is empty after trimming
    #[error("Please enter your name")]
    EmptyUserName,
}

impl ValidationError {
    /// Stable machine-readable code for this failure
    ///
    /// For [`ValidationError::InvalidItem`] the code of the underlying
    /// name or price failure is returned.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "EMPTY_NAME",
            ValidationError::NameTooLong { .. } => "NAME_TOO_LONG",
            ValidationError::EmptyPrice => "EMPTY_PRICE",
            ValidationError::NotANumber => "NOT_A_NUMBER",
            ValidationError::NotPositive => "NOT_POSITIVE",
            ValidationError::TooLarge => "TOO_LARGE",
            ValidationError::EmptyList => "EMPTY_LIST",
            ValidationError::MissingId { .. } => "MISSING_ID",
            ValidationError::InvalidItem { reason, .. } => reason.code(),
            ValidationError::DuplicateId => "DUPLICATE_ID",
            ValidationError::EmptyUserName => "EMPTY_USER_NAME",
        }
    }

    /// 1-based position of the offending item, for list failures
    pub fn position(&self) -> Option<usize> {
        match self {
            ValidationError::MissingId { position }
            | ValidationError::InvalidItem { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError {
            kind: ErrorType::ValidationError,
            message: err.to_string(),
            details: Some(err.code().to_string()),
            retryable: false,
        }
    }
}

/// Failure reported by a raw key-value backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write would exceed the backend's capacity
    #[error("QuotaExceededError: storage quota of {limit} bytes exceeded")]
    QuotaExceeded {
        /// Configured capacity in bytes
        limit: u64,
    },

    /// The backend cannot be used at all
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Code identifying a critical storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageErrorCode {
    /// The availability probe failed
    StorageUnavailable,
    /// The backend reported a quota/capacity error
    StorageFull,
    /// Any other write failure
    StorageWriteFailed,
    /// Stored data could not be parsed and was discarded
    CorruptData,
    /// A delete on an available store failed
    StorageClearFailed,
}

impl StorageErrorCode {
    /// Stable machine-readable code
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            StorageErrorCode::StorageFull => "STORAGE_FULL",
            StorageErrorCode::StorageWriteFailed => "STORAGE_WRITE_FAILED",
            StorageErrorCode::CorruptData => "CORRUPT_DATA",
            StorageErrorCode::StorageClearFailed => "STORAGE_CLEAR_FAILED",
        }
    }

    fn user_message(&self) -> &'static str {
        match self {
            StorageErrorCode::StorageUnavailable => "Private mode: your list will not be saved",
            StorageErrorCode::StorageFull => "Storage is full. Please clear old data",
            StorageErrorCode::StorageWriteFailed => "Could not save data",
            StorageErrorCode::CorruptData => {
                "Saved data was invalid. It has been cleared and a new list started"
            }
            StorageErrorCode::StorageClearFailed => "Could not clear data",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Critical storage failure
///
/// Carries a user-facing message, a technical detail string, and a
/// retryable flag (currently always false).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StorageError {
    /// Failure code
    pub code: StorageErrorCode,
    /// User-facing message
    pub message: String,
    /// Technical detail
    pub details: Option<String>,
    /// Whether retrying may succeed
    pub retryable: bool,
}

impl StorageError {
    /// Create a storage error with the standard message for `code`
    pub fn new(code: StorageErrorCode, details: impl Into<String>) -> Self {
        Self {
            code,
            message: code.user_message().to_string(),
            details: Some(details.into()),
            retryable: false,
        }
    }

    /// Classify a failed write: quota errors become `STORAGE_FULL`,
    /// everything else `STORAGE_WRITE_FAILED`
    pub fn from_write(err: StoreError) -> Self {
        match err {
            StoreError::QuotaExceeded { .. } => {
                Self::new(StorageErrorCode::StorageFull, err.to_string())
            }
            other => Self::new(StorageErrorCode::StorageWriteFailed, other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError {
            kind: ErrorType::StorageError,
            message: err.message,
            details: err.details,
            retryable: err.retryable,
        }
    }
}

/// Errors from building, archiving, or sending a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Web app URL or API key is missing
    #[error("Report service is not configured")]
    NotConfigured,

    /// The item list did not pass validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The local report archive failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Transport-level failure talking to the report service
    #[error("Report service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with something other than JSON
    #[error("Report service returned HTML or invalid JSON: {details}")]
    InvalidResponse {
        /// First characters of the response body
        details: String,
    },

    /// Request payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Validation(e) => e.into(),
            ReportError::Storage(e) => e.into(),
            ReportError::Http(e) => AppError {
                kind: ErrorType::NetworkError,
                message: "Could not reach the report service".to_string(),
                details: Some(e.to_string()),
                retryable: true,
            },
            ReportError::InvalidResponse { details } => AppError {
                kind: ErrorType::ApiError,
                message: "Report service returned an invalid response".to_string(),
                details: Some(details),
                retryable: false,
            },
            other => AppError {
                kind: ErrorType::UnknownError,
                message: other.to_string(),
                details: None,
                retryable: false,
            },
        }
    }
}

/// Errors from currency and date formatting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Amount is below zero
    #[error("Amount must be non-negative")]
    NegativeAmount,

    /// Amount is NaN or infinite
    #[error("Amount must be a finite number")]
    InvalidAmount,

    /// Input is not an RFC 3339 timestamp
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Main error type for ShopTally operations
#[derive(Error, Debug)]
pub enum ShopTallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Item or list validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Critical storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Raw key-value backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Report errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Formatting errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// No item id starts with the given text
    #[error("No item matches '{0}'")]
    ItemNotFound(String),

    /// More than one item id starts with the given text
    #[error("'{0}' matches more than one item; use more characters of the ID")]
    AmbiguousId(String),

    /// No saved report at the given position
    #[error("No saved report at position {0}")]
    ReportNotFound(usize),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ShopTallyError> for AppError {
    fn from(err: ShopTallyError) -> Self {
        match err {
            ShopTallyError::Validation(e) => e.into(),
            ShopTallyError::Storage(e) => e.into(),
            ShopTallyError::Report(e) => e.into(),
            other => AppError {
                kind: ErrorType::UnknownError,
                message: other.to_string(),
                details: None,
                retryable: false,
            },
        }
    }
}

/// Turn an application error into the user-facing shape
///
/// Known error types keep their category and retry hint; anything else is
/// reported as [`ErrorType::UnknownError`] with the full context chain.
pub fn classify(err: anyhow::Error) -> AppError {
    let err = match err.downcast::<ValidationError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<StorageError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<ReportError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<ShopTallyError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };

    AppError {
        kind: ErrorType::UnknownError,
        message: format!("{:#}", err),
        details: None,
        retryable: false,
    }
}

/// Result type alias for application-level operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
