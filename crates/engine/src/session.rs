//! An explicitly owned editing session.
//!
//! The document and link index travel together as one owned value instead
//! of process-wide state, so multiple documents or concurrent sessions are
//! possible without cross-talk. The session has no internal locking:
//! callers serialize writes (the server wraps a session in a single
//! `Mutex`). `update_cell` and an index rebuild are two separate calls the
//! caller sequences.

use crate::changes::CellChange;
use crate::document::{Document, Row};
use crate::error::EngineError;
use crate::link_index::LinkIndex;

/// One document plus its designated link columns and derived index.
#[derive(Debug, Default)]
pub struct Session {
    document: Document,
    link_columns: Vec<String>,
    link_index: LinkIndex,
}

/// Point-in-time view of the session for the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetadata {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub link_rows: usize,
    pub dirty_count: usize,
    pub is_dirty: bool,
    pub source_name: String,
    pub link_columns: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document wholesale: rows, columns, dirty set and change
    /// log all come from `document`; link columns and index reset. The
    /// caller constructs the document first, so a failed parse never
    /// reaches this point and the prior state survives it.
    pub fn load(&mut self, document: Document) {
        self.document = document;
        self.link_columns.clear();
        self.link_index = LinkIndex::new();
    }

    /// Designate the link columns (ordered) and build the index over the
    /// current document contents. Returns the index size.
    pub fn set_link_columns(&mut self, columns: Vec<String>) -> Result<usize, EngineError> {
        if columns.is_empty() {
            return Err(EngineError::Validation(
                "link column list is empty".to_string(),
            ));
        }
        self.link_columns = columns;
        self.rebuild_link_index();
        Ok(self.link_index.len())
    }

    /// Full re-scan of the current document against the designated columns.
    /// Callers invoke this after editing a cell in a designated column.
    pub fn rebuild_link_index(&mut self) {
        self.link_index = LinkIndex::build(self.document.all_rows(), &self.link_columns);
    }

    pub fn is_link_column(&self, column: &str) -> bool {
        self.link_columns.iter().any(|c| c == column)
    }

    pub fn update_cell(
        &mut self,
        position: usize,
        column: &str,
        value: &str,
    ) -> Result<(), EngineError> {
        self.document.update_cell(position, column, value)
    }

    pub fn metadata(&self) -> SessionMetadata {
        SessionMetadata {
            row_count: self.document.row_count(),
            columns: self.document.columns().to_vec(),
            link_rows: self.link_index.len(),
            dirty_count: self.document.dirty_count(),
            is_dirty: self.document.is_dirty(),
            source_name: self.document.source_name().to_string(),
            link_columns: self.link_columns.clone(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn link_columns(&self) -> &[String] {
        &self.link_columns
    }

    pub fn link_index(&self) -> &LinkIndex {
        &self.link_index
    }

    pub fn row(&self, position: usize) -> Option<&Row> {
        self.document.row(position)
    }

    pub fn rows_slice(&self, start: usize, count: usize) -> Vec<(usize, &Row)> {
        self.document.rows_slice(start, count)
    }

    pub fn changes(&self) -> Vec<CellChange> {
        self.document.changes()
    }
}
