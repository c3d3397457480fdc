use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Errors that can occur while fetching a sheet export
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Sheet export returned status {0}; make sure the sheet is shared with \"Anyone with the link\"")]
    BadStatus(u16),
}

/// Source of raw CSV text keyed by an opaque sheet id
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_csv(&self, sheet_id: &str) -> Result<String, SheetsError>;
}

/// Public CSV export of a shared spreadsheet
pub struct SheetsClient {
    base_url: String,
    client: Client,
}

impl SheetsClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    pub fn export_url(&self, sheet_id: &str) -> String {
        format!(
            "{}/{}/gviz/tq?tqx=out:csv",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(sheet_id.trim())
        )
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_csv(&self, sheet_id: &str) -> Result<String, SheetsError> {
        let url = self.export_url(sheet_id);
        tracing::debug!("Fetching sheet export from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::error!("Sheet export for {} failed with {}", sheet_id, status);
            return Err(SheetsError::BadStatus(status.as_u16()));
        }

        let text = response.text().await?;
        tracing::debug!("Fetched {} bytes of CSV for sheet {}", text.len(), sheet_id);
        Ok(text)
    }
}
