//! Per-cell change tracking.
//!
//! The change log is a durable audit trail for the lifetime of a loaded
//! document: it is never pruned, survives a remote-sync flush ("synced"
//! and "dirty" are different concepts), and only resets on the next load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record for one edited cell.
///
/// At most one record exists per (row, column) pair. `original` is captured
/// at the first edit of that cell and never changes afterward; `current`
/// and `timestamp` are overwritten by every subsequent distinct write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: usize,
    pub column: String,
    pub original: String,
    pub current: String,
    pub timestamp: DateTime<Utc>,
}

/// Insertion-ordered log of cell edits.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<CellChange>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the record for (row, column).
    ///
    /// A first edit captures `previous` as the original value; later edits
    /// keep that original and only move `current`. A cell edited back to
    /// its original value keeps its record (`current == original`);
    /// downstream consumers rely on the record existing even when net-zero.
    pub fn record(&mut self, row: usize, column: &str, previous: &str, next: &str) {
        let now = Utc::now();
        match self
            .entries
            .iter_mut()
            .find(|c| c.row == row && c.column == column)
        {
            Some(existing) => {
                existing.current = next.to_string();
                existing.timestamp = now;
            }
            None => self.entries.push(CellChange {
                row,
                column: column.to_string(),
                original: previous.to_string(),
                current: next.to_string(),
                timestamp: now,
            }),
        }
    }

    /// Snapshot of all records, oldest first. Not a live view.
    pub fn all(&self) -> Vec<CellChange> {
        self.entries.clone()
    }

    /// Snapshot of the records touching one row.
    pub fn for_row(&self, row: usize) -> Vec<CellChange> {
        self.entries.iter().filter(|c| c.row == row).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
