//! Google Sheets adapter and the Drive to Sheet sync

use crate::services::http::{read_json, require};
use crate::services::{FileHosting, ServiceError, TokenProvider};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const SERVICE: &str = "sheets";

/// Header row written above the file listing
pub const SYNC_HEADER: [&str; 4] = ["Name", "File ID", "MIME type", "Link"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_rows: u32,
    #[serde(default)]
    updated_range: Option<String>,
}

/// Result of a values write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetWrite {
    /// Rows reported as updated by the API
    pub updated_rows: u32,
    /// Range actually written
    pub updated_range: Option<String>,
}

/// Spreadsheet values writer
#[async_trait]
pub trait SheetWriter: Send + Sync {
    /// Overwrite `range` of `spreadsheet_id` with `rows`
    async fn write_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<SheetWrite, ServiceError>;
}

/// Sheets v4 REST client
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: Url,
}

impl SheetsClient {
    /// Create a client against `base_url` (normally `https://sheets.googleapis.com`)
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` if `base_url` is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid Sheets URL: {}", e)))?;
        Ok(Self {
            http,
            tokens,
            base_url,
        })
    }
}

#[async_trait]
impl SheetWriter for SheetsClient {
    async fn write_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<SheetWrite, ServiceError> {
        require(spreadsheet_id, "spreadsheet id")?;
        require(range, "range")?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidInput("Sheets URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let body: UpdateValuesResponse = read_json(SERVICE, response).await?;
        Ok(SheetWrite {
            updated_rows: body.updated_rows,
            updated_range: body.updated_range,
        })
    }
}

/// Outcome of [`sync_folder_to_sheet`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSync {
    /// Folder that was listed
    pub folder_id: String,
    /// Number of files found
    pub file_count: usize,
    /// What the Sheets API reported
    pub write: SheetWrite,
}

/// List a Drive folder and write one row per file, under a header row
pub async fn sync_folder_to_sheet(
    files: &dyn FileHosting,
    sheets: &dyn SheetWriter,
    folder_id: &str,
    spreadsheet_id: &str,
    range: &str,
) -> Result<SheetSync, ServiceError> {
    let listing = files.list_files(folder_id).await?;

    let mut rows = Vec::with_capacity(listing.len() + 1);
    rows.push(SYNC_HEADER.iter().map(|h| h.to_string()).collect());
    rows.extend(listing.iter().map(|file| {
        vec![
            file.name.clone(),
            file.id.clone(),
            file.mime_type.clone(),
            file.web_view_link.clone().unwrap_or_default(),
        ]
    }));

    let write = sheets.write_rows(spreadsheet_id, range, rows).await?;

    tracing::info!(
        folder_id = %folder_id,
        spreadsheet_id = %spreadsheet_id,
        file_count = listing.len(),
        "Drive folder synced to sheet"
    );

    Ok(SheetSync {
        folder_id: folder_id.to_string(),
        file_count: listing.len(),
        write,
    })
}
