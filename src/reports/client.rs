//! Client for the spreadsheet report web app
//!
//! The web app is called with a single GET carrying the action, the API
//! key, and the JSON-encoded report. PDF export is always switched off.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::reports::SavedReport;
use crate::storage::Item;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Action name understood by the web app
const CREATE_REPORT_ACTION: &str = "createReport";

/// How much of an unparseable body is kept for diagnostics
const RESPONSE_SNIPPET_CHARS: usize = 200;

/// Payload sent to the web app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReportRequest {
    /// Name shown on the report
    pub user_name: String,
    /// Items in list order
    pub items: Vec<Item>,
    /// When the report was created (ISO 8601)
    pub timestamp: String,
    /// Sum of item prices
    pub total_amount: f64,
    /// Whether a PDF should be produced
    #[serde(rename = "exportPDF")]
    pub export_pdf: bool,
}

impl SaveReportRequest {
    /// Build the payload for an archived report, with PDF export off
    pub fn from_report(report: &SavedReport) -> Self {
        Self {
            user_name: report.user_name.clone(),
            items: report.items.clone(),
            timestamp: report.timestamp.clone(),
            total_amount: report.total_amount,
            export_pdf: false,
        }
    }
}

/// Answer from the web app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveReportResponse {
    /// Whether the sheet was created
    pub success: bool,
    /// URL of the created sheet
    pub sheet_url: Option<String>,
    /// URL of the exported PDF
    pub pdf_url: Option<String>,
    /// Failure description from the web app
    pub error: Option<String>,
}

/// HTTP client for the report web app
pub struct ReportClient {
    http: reqwest::Client,
    web_app_url: String,
    api_key: String,
}

impl ReportClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// [`ReportError::NotConfigured`] when the URL or API key is missing
    pub fn new(config: &ReportConfig) -> Result<Self, ReportError> {
        let (Some(web_app_url), Some(api_key)) = (&config.web_app_url, &config.api_key) else {
            return Err(ReportError::NotConfigured);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            web_app_url: web_app_url.clone(),
            api_key: api_key.clone(),
        })
    }

    /// Send a report to the web app
    ///
    /// The response body is parsed as JSON whatever the HTTP status, since
    /// the web app reports failures in the body.
    ///
    /// # Errors
    ///
    /// [`ReportError::Http`] on transport failures and
    /// [`ReportError::InvalidResponse`] when the body is not JSON.
    pub async fn save_report(
        &self,
        request: &SaveReportRequest,
    ) -> Result<SaveReportResponse, ReportError> {
        let mut request = request.clone();
        request.export_pdf = false;
        let data = serde_json::to_string(&request)?;

        tracing::info!(
            items = request.items.len(),
            total = request.total_amount,
            "Sending report to spreadsheet service"
        );

        let response = self
            .http
            .get(&self.web_app_url)
            .query(&[
                ("action", CREATE_REPORT_ACTION),
                ("apiKey", self.api_key.as_str()),
                ("data", data.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, "Report service responded");

        serde_json::from_str(&body).map_err(|_| {
            let details: String = body.chars().take(RESPONSE_SNIPPET_CHARS).collect();
            tracing::error!(%status, "Report service returned HTML or invalid JSON");
            ReportError::InvalidResponse { details }
        })
    }
}
