//! LinkGrid session protocol: v1 frozen wire format.
//!
//! The wire format is JSONL (newline-delimited JSON) over TCP localhost:
//! one request line in, one response line out. Changes require a version
//! bump in [`PROTOCOL_VERSION`] and new vectors in
//! `crates/cli/tests/protocol_contract.rs`.
//!
//! ```ignore
//! use linkgrid_protocol::{Request, Response};
//!
//! let req = Request::Metadata;
//! let json = serde_json::to_string(&req)?;
//! let resp: Response = serde_json::from_str(&line)?;
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// =============================================================================
// Client → Server Requests
// =============================================================================

/// Requests sent from a client to the session server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Load a document from raw CSV text, replacing any current document.
    Load { content: String, source_name: String },
    /// Designate the link columns (ordered) and build the link index.
    SetLinkColumns { columns: Vec<String> },
    /// Snapshot of document/index state.
    Metadata,
    /// A clamped page of rows.
    Rows { start: usize, count: usize },
    /// A single row by position.
    Row { position: usize },
    /// Write one cell.
    UpdateCell {
        position: usize,
        column: String,
        value: String,
    },
    /// Serialize the current document back to CSV.
    Export,
    /// Nearest link row strictly after `from` (`-1` = nothing selected).
    NextLink { from: i64 },
    /// Nearest link row strictly before `from`.
    PrevLink { from: i64 },
    /// All link-row positions.
    LinkRows,
    /// Full change list (audit).
    Changes,
    /// Push the change log to a remote spreadsheet and clear the dirty set.
    PushChanges {
        spreadsheet_id: String,
        /// Sheet tab gid; the first tab when absent.
        gid: Option<String>,
    },
    /// Liveness check.
    Ping,
}

// =============================================================================
// Server → Client Responses
// =============================================================================

/// Responses sent from the session server to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Loaded {
        row_count: usize,
        columns: Vec<String>,
        source_name: String,
    },
    LinkColumnsSet {
        link_rows: usize,
        columns: Vec<String>,
    },
    Metadata(MetadataPayload),
    Rows {
        rows: Vec<RowPayload>,
    },
    Row {
        row: RowPayload,
    },
    CellUpdated {
        is_dirty: bool,
        dirty_count: usize,
        link_rows: usize,
    },
    Exported {
        content: String,
        file_name: String,
    },
    LinkPosition {
        position: Option<usize>,
    },
    LinkRowList {
        positions: Vec<usize>,
    },
    ChangeList {
        changes: Vec<ChangePayload>,
    },
    ChangesPushed {
        updated_cells: usize,
    },
    Pong,
    Error {
        code: String,
        message: String,
    },
}

/// Document/index state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPayload {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub link_rows: usize,
    pub dirty_count: usize,
    pub is_dirty: bool,
    pub source_name: String,
    pub link_columns: Vec<String>,
}

/// One row tagged with its absolute position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPayload {
    pub position: usize,
    pub cells: HashMap<String, String>,
}

/// One change record. Timestamps travel as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePayload {
    pub position: usize,
    pub column: String,
    pub original: String,
    pub current: String,
    pub timestamp_ms: i64,
}

// Stable error codes, shared by server and clients.
pub const ERR_PARSE: &str = "parse_error";
pub const ERR_NOT_FOUND: &str = "not_found";
pub const ERR_VALIDATION: &str = "validation";
pub const ERR_BAD_REQUEST: &str = "bad_request";
pub const ERR_REMOTE: &str = "remote_error";
pub const ERR_INTERNAL: &str = "internal";

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}
