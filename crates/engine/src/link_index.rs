//! Derived index of rows whose designated columns contain a link.
//!
//! The index is a pure function of (document contents, designated link
//! columns) and is rebuilt from scratch whenever either input changes;
//! there is no incremental update path. A full O(rows x columns) scan is
//! acceptable at spreadsheet row counts, and the two call sites (initial
//! designation, post-edit rebuild) are explicit.

use crate::document::Row;
use crate::links;

/// Strictly ascending row positions with a link in a designated column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkIndex {
    positions: Vec<usize>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan rows in position order. A row contributes at most one entry:
    /// the scan stops at the first designated column (in caller-supplied
    /// order) whose value matches. Empty `link_columns` yields an empty
    /// index.
    pub fn build(rows: &[Row], link_columns: &[String]) -> Self {
        let mut positions = Vec::new();
        for (position, row) in rows.iter().enumerate() {
            for column in link_columns {
                if let Some(value) = row.get(column) {
                    if links::contains_link(value) {
                        positions.push(position);
                        break;
                    }
                }
            }
        }
        Self { positions }
    }

    /// Smallest entry strictly greater than `from`. `from = -1` is the
    /// "no row selected yet" sentinel and returns the first entry.
    pub fn find_next(&self, from: i64) -> Option<usize> {
        self.positions.iter().copied().find(|&p| p as i64 > from)
    }

    /// Largest entry strictly less than `from`. `from = row_count` returns
    /// the last entry.
    pub fn find_prev(&self, from: i64) -> Option<usize> {
        self.positions
            .iter()
            .copied()
            .rev()
            .find(|&p| (p as i64) < from)
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
