//! Saved reports
//!
//! Finalizing a list archives it locally under `savedReports`, sends it to
//! the spreadsheet web app when one is configured, and starts a fresh list.
//! The archive is the source of truth; the remote call is best effort.

use crate::error::{ReportError, StorageError, StorageErrorCode, ValidationError};
use crate::manager::ItemManager;
use crate::storage::{now_iso8601, Item, KeyValueStore};
use crate::validation::validate_item_list;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ReportClient, SaveReportRequest, SaveReportResponse};

/// Key holding the JSON array of saved reports, oldest first
pub const REPORTS_KEY: &str = "savedReports";
/// Key holding the display name used on reports
pub const USER_NAME_KEY: &str = "userName";
/// Name used when none has been set
pub const DEFAULT_USER_NAME: &str = "Người dùng";

/// A finalized shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    /// Name of the person who saved it
    pub user_name: String,
    /// Items at the time of saving
    pub items: Vec<Item>,
    /// When it was saved (ISO 8601)
    pub timestamp: String,
    /// Sum of item prices
    pub total_amount: f64,
    /// Spreadsheet URL, when the web app created one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
}

/// Local history of saved reports plus the user's display name
pub struct ReportArchive<S> {
    store: S,
}

impl<S: KeyValueStore> ReportArchive<S> {
    /// Wrap a key-value store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored display name, or [`DEFAULT_USER_NAME`]
    pub fn user_name(&self) -> String {
        match self.store.get(USER_NAME_KEY) {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => DEFAULT_USER_NAME.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read user name");
                DEFAULT_USER_NAME.to_string()
            }
        }
    }

    /// Store a new display name; it is trimmed first
    pub fn set_user_name(&self, name: &str) -> Result<String, ReportError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyUserName.into());
        }

        self.store
            .set(USER_NAME_KEY, trimmed)
            .map_err(StorageError::from_write)?;
        Ok(trimmed.to_string())
    }

    fn load(&self) -> Result<Vec<SavedReport>, ReportError> {
        let raw = match self.store.get(REPORTS_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Ok(Vec::new()),
            Err(e) => {
                return Err(
                    StorageError::new(StorageErrorCode::StorageUnavailable, e.to_string()).into(),
                )
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            tracing::error!(error = %e, "Failed to load saved reports");
            StorageError::new(StorageErrorCode::CorruptData, e.to_string()).into()
        })
    }

    fn store_all(&self, reports: &[SavedReport]) -> Result<(), ReportError> {
        let serialized = serde_json::to_string(reports)?;
        self.store
            .set(REPORTS_KEY, &serialized)
            .map_err(StorageError::from_write)?;
        Ok(())
    }

    /// Saved reports, newest first
    pub fn list(&self) -> Result<Vec<SavedReport>, ReportError> {
        let mut reports = self.load()?;
        reports.reverse();
        Ok(reports)
    }

    /// Append a report to the history
    pub fn append(&self, report: &SavedReport) -> Result<(), ReportError> {
        let mut reports = self.load()?;
        reports.push(report.clone());
        self.store_all(&reports)
    }

    /// Record the sheet URL on the newest report with `timestamp`
    ///
    /// Returns whether a matching report was found.
    pub fn attach_sheet_url(&self, timestamp: &str, sheet_url: &str) -> Result<bool, ReportError> {
        let mut reports = self.load()?;
        let Some(report) = reports.iter_mut().rev().find(|r| r.timestamp == timestamp) else {
            return Ok(false);
        };
        report.sheet_url = Some(sheet_url.to_string());
        self.store_all(&reports)?;
        Ok(true)
    }

    /// Delete the report at `index` in newest-first order
    pub fn delete(&self, index: usize) -> Result<Option<SavedReport>, ReportError> {
        let mut reports = self.list()?;
        if index >= reports.len() {
            return Ok(None);
        }

        let removed = reports.remove(index);
        reports.reverse();
        self.store_all(&reports)?;
        Ok(Some(removed))
    }

    /// Delete every saved report
    pub fn clear(&self) -> Result<(), ReportError> {
        self.store.remove(REPORTS_KEY).map_err(|e| {
            StorageError::new(StorageErrorCode::StorageClearFailed, e.to_string())
        })?;
        Ok(())
    }
}

/// What happened on the remote side of a finalize
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteStatus {
    /// No report service configured
    Skipped,
    /// A sheet was created
    Created {
        /// URL of the sheet
        sheet_url: String,
    },
    /// The service answered but did not create a sheet
    Rejected {
        /// Error reported by the service
        error: Option<String>,
    },
    /// The call failed
    Failed(String),
}

/// Result of [`finalize_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedReport {
    /// The archived report
    pub report: SavedReport,
    /// Outcome of the remote call
    pub remote: RemoteStatus,
}

/// Archive the current list as a report and start a new one
///
/// The list is validated first; nothing changes when it is invalid. After
/// the report is archived the web app is called (when `client` is given),
/// its failures only logged, and finally the list is cleared.
///
/// # Errors
///
/// Validation errors for the list, or storage errors from the archive.
pub async fn finalize_report<S, A>(
    manager: &mut ItemManager<S>,
    archive: &ReportArchive<A>,
    client: Option<&ReportClient>,
) -> Result<FinalizedReport, ReportError>
where
    S: KeyValueStore,
    A: KeyValueStore,
{
    validate_item_list(manager.items())?;

    let mut report = SavedReport {
        user_name: archive.user_name(),
        items: manager.items().to_vec(),
        timestamp: now_iso8601(),
        total_amount: manager.calculate_total(),
        sheet_url: None,
    };
    archive.append(&report)?;
    tracing::info!(
        items = report.items.len(),
        total = report.total_amount,
        "Archived report"
    );

    let remote = match client {
        None => RemoteStatus::Skipped,
        Some(client) => {
            match client
                .save_report(&SaveReportRequest::from_report(&report))
                .await
            {
                Ok(SaveReportResponse {
                    success: true,
                    sheet_url: Some(sheet_url),
                    ..
                }) => {
                    if let Err(e) = archive.attach_sheet_url(&report.timestamp, &sheet_url) {
                        tracing::warn!(error = %e, "Failed to record sheet URL");
                    }
                    report.sheet_url = Some(sheet_url.clone());
                    RemoteStatus::Created { sheet_url }
                }
                Ok(response) => {
                    tracing::warn!(
                        error = response.error.as_deref().unwrap_or("Unknown error"),
                        "Spreadsheet was not created"
                    );
                    RemoteStatus::Rejected {
                        error: response.error,
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Report service call failed");
                    RemoteStatus::Failed(e.to_string())
                }
            }
        }
    };

    manager.clear_all();

    Ok(FinalizedReport { report, remote })
}
