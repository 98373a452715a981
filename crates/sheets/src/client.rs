//! Google Sheets values-API client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the sync
//! flow: resolve sheet title → fetch values → batch-update edited cells
//! from the change log.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use linkgrid_engine::CellChange;
use serde_json::json;

use crate::a1;
use crate::auth::{load_credentials, Credentials};

/// Error type for remote sheet operations.
#[derive(Debug)]
pub enum SheetsError {
    /// No stored credentials.
    NotAuthenticated,
    /// Network error.
    Network(String),
    /// HTTP error with status code.
    Http(u16, String),
    /// Response body could not be parsed.
    Parse(String),
    /// A change record names a column the document does not have.
    UnknownColumn(String),
    /// The remote sheet has no rows.
    EmptySheet,
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => {
                write!(f, "not authenticated. Run `lgrid login` first")
            }
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Http(403, _) => write!(
                f,
                "permission denied. Please ensure you have access to this sheet"
            ),
            Self::Http(404, _) => write!(f, "sheet not found or you do not have access"),
            Self::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::UnknownColumn(column) => write!(f, "column '{}' not found", column),
            Self::EmptySheet => write!(f, "sheet is empty"),
        }
    }
}

impl std::error::Error for SheetsError {}

/// One pending remote cell write in A1 notation (sheet title added at
/// request time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub range: String,
    pub value: String,
}

/// Values-API client (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl SheetsClient {
    /// Create a client from credentials saved by `lgrid login`.
    pub fn from_saved_credentials() -> Result<Self, SheetsError> {
        let creds = load_credentials().ok_or(SheetsError::NotAuthenticated)?;
        Ok(Self::new(creds))
    }

    pub fn new(creds: Credentials) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("lgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            api_base: creds.api_base,
            token: creds.access_token,
        }
    }

    #[cfg(test)]
    fn with_base_url(token: String, api_base: String) -> Self {
        Self::new(Credentials::new(token, Some(api_base)))
    }

    /// Resolve a sheet tab title from its gid. Falls back to the first
    /// sheet when the gid is absent or unknown, then to "Sheet1".
    pub fn sheet_title(
        &self,
        spreadsheet_id: &str,
        gid: Option<&str>,
    ) -> Result<String, SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}?fields=sheets.properties",
            self.api_base, spreadsheet_id
        );
        let body = self.get_json(&url)?;

        let sheets = body
            .get("sheets")
            .and_then(|s| s.as_array())
            .cloned()
            .unwrap_or_default();

        if let Some(gid) = gid {
            for sheet in &sheets {
                let props = &sheet["properties"];
                if props["sheetId"].as_i64().map(|id| id.to_string()).as_deref() == Some(gid) {
                    if let Some(title) = props["title"].as_str() {
                        return Ok(title.to_string());
                    }
                }
            }
        }

        Ok(sheets
            .first()
            .and_then(|s| s["properties"]["title"].as_str())
            .unwrap_or("Sheet1")
            .to_string())
    }

    /// Fetch a sheet's values: the first row is the header, the rest are
    /// data rows. Errors on an empty sheet.
    #[allow(clippy::type_complexity)]
    pub fn fetch_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<(Vec<String>, Vec<Vec<String>>), SheetsError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base, spreadsheet_id, range
        );
        let body = self.get_json(&url)?;

        let values = body
            .get("values")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if values.is_empty() {
            return Err(SheetsError::EmptySheet);
        }

        let to_strings = |row: &serde_json::Value| -> Vec<String> {
            row.as_array()
                .map(|cells| cells.iter().map(cell_to_string).collect())
                .unwrap_or_default()
        };

        let header = to_strings(&values[0]);
        let rows = values[1..].iter().map(to_strings).collect();
        Ok((header, rows))
    }

    /// Batch-write values, one cell per range, `valueInputOption: RAW`.
    /// Returns the number of cells written. An empty batch is a successful
    /// no-op without any HTTP call.
    pub fn batch_update(
        &self,
        spreadsheet_id: &str,
        sheet_title: &str,
        writes: &[CellWrite],
    ) -> Result<usize, SheetsError> {
        if writes.is_empty() {
            return Ok(0);
        }

        let data: Vec<serde_json::Value> = writes
            .iter()
            .map(|w| {
                json!({
                    "range": format!("{}!{}", sheet_title, w.range),
                    "values": [[w.value]],
                })
            })
            .collect();

        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchUpdate",
            self.api_base, spreadsheet_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "valueInputOption": "RAW",
                "data": data,
            }))
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(SheetsError::Http(status.as_u16(), text));
        }

        Ok(writes.len())
    }

    /// Convert change records into A1 writes using the document's column
    /// order and push them in one batch. An empty change list returns
    /// `Ok(0)` without touching the network.
    pub fn push_changes(
        &self,
        spreadsheet_id: &str,
        sheet_title: &str,
        columns: &[String],
        changes: &[CellChange],
    ) -> Result<usize, SheetsError> {
        let writes = changes_to_writes(columns, changes)?;
        self.batch_update(spreadsheet_id, sheet_title, &writes)
    }

    fn get_json(&self, url: &str) -> Result<serde_json::Value, SheetsError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(SheetsError::Http(status.as_u16(), text));
        }

        response
            .json()
            .map_err(|e| SheetsError::Parse(e.to_string()))
    }
}

/// Map change records to A1 writes. Row ordinal 0 becomes row number 1.
pub fn changes_to_writes(
    columns: &[String],
    changes: &[CellChange],
) -> Result<Vec<CellWrite>, SheetsError> {
    changes
        .iter()
        .map(|change| {
            let ordinal = columns
                .iter()
                .position(|c| *c == change.column)
                .ok_or_else(|| SheetsError::UnknownColumn(change.column.clone()))?;
            Ok(CellWrite {
                range: a1::cell_ref(change.row, ordinal),
                value: change.current.clone(),
            })
        })
        .collect()
}

/// Pad remote rows to the header width and key them by column name, the
/// shape `Document::from_parts` adopts.
pub fn values_to_rows(header: &[String], rows: &[Vec<String>]) -> Vec<HashMap<String, String>> {
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
