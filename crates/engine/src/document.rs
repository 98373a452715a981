//! The tabular document: row store and dirty/change bookkeeping.

use std::collections::{HashMap, HashSet};

use crate::changes::{CellChange, ChangeLog};
use crate::error::EngineError;

/// One row: a mapping from column name to string value. Key order is
/// insignificant; export order comes from the document's column list.
pub type Row = HashMap<String, String>;

/// A loaded tabular dataset.
///
/// A row's identity is its zero-based position, stable for the lifetime of
/// the document; there are no row insert/delete operations, only cell
/// mutation. Loading replaces the document wholesale; there are no merge
/// semantics.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    columns: Vec<String>,
    source_name: String,
    dirty_rows: HashSet<usize>,
    change_log: ChangeLog,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// Adopt an ordered column list and row sequence verbatim.
    ///
    /// Rows are normalized so every column present at load time exists in
    /// every row (missing keys become empty strings). Parsing the source
    /// text into these parts is the IO layer's concern; an empty column
    /// list is the "parse yielded no columns" failure.
    pub fn from_parts(
        columns: Vec<String>,
        mut rows: Vec<Row>,
        source_name: &str,
    ) -> Result<Self, EngineError> {
        if columns.is_empty() {
            return Err(EngineError::Parse(format!(
                "'{source_name}': no column list"
            )));
        }
        for row in &mut rows {
            for column in &columns {
                row.entry(column.clone()).or_default();
            }
        }
        Ok(Self {
            rows,
            columns,
            source_name: source_name.to_string(),
            dirty_rows: HashSet::new(),
            change_log: ChangeLog::new(),
        })
    }

    /// An empty document, the state before anything is loaded.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            source_name: String::new(),
            dirty_rows: HashSet::new(),
            change_log: ChangeLog::new(),
        }
    }

    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Up to `count` rows starting at `start`, each tagged with its
    /// absolute position. Out-of-range input clamps; it never errors.
    pub fn rows_slice(&self, start: usize, count: usize) -> Vec<(usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .skip(start)
            .take(count)
            .collect()
    }

    pub fn all_rows(&self) -> &[Row] {
        &self.rows
    }

    /// Write one cell.
    ///
    /// A write where the new value equals the stored value is a successful
    /// no-op: no dirty mark, no change record. A distinct value stores,
    /// marks the row dirty, and upserts the change record. On failure the
    /// document is byte-for-byte as before the call.
    pub fn update_cell(
        &mut self,
        position: usize,
        column: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(EngineError::ColumnNotFound(column.to_string()));
        }
        let row = self
            .rows
            .get_mut(position)
            .ok_or(EngineError::RowNotFound(position))?;
        let stored = row.get(column).cloned().unwrap_or_default();
        if stored == value {
            return Ok(());
        }
        row.insert(column.to_string(), value.to_string());
        self.dirty_rows.insert(position);
        self.change_log.record(position, column, &stored, value);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_rows.len()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_rows.is_empty()
    }

    /// Snapshot of the full change log, oldest first.
    pub fn changes(&self) -> Vec<CellChange> {
        self.change_log.all()
    }

    pub fn changes_for_row(&self, position: usize) -> Vec<CellChange> {
        self.change_log.for_row(position)
    }

    /// Clear the dirty set without touching the change log. Callers may do
    /// this after a successful export or remote sync; the audit trail stays.
    pub fn mark_clean(&mut self) {
        self.dirty_rows.clear();
    }
}
