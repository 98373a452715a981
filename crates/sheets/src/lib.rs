//! Remote spreadsheet sync adapter.
//!
//! Translates change-log entries into the Google Sheets values API's cell
//! addressing (column ordinal → base-26 letters, row ordinal → 1-based row
//! number) and batches the current values as writes. Blocking reqwest
//! client; no Tokio runtime required.

pub mod a1;
pub mod auth;
pub mod client;

pub use auth::{clear_credentials, load_credentials, save_credentials, Credentials};
pub use client::{changes_to_writes, values_to_rows, CellWrite, SheetsClient, SheetsError};
