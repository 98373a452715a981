use std::fmt;

/// Failure taxonomy for the document engine.
///
/// Every variant is returned to the caller, never panicked across the API
/// boundary. A failed operation leaves the document untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input at load time. Fatal to that load attempt only;
    /// the previously loaded document (if any) is retained by the caller.
    Parse(String),
    /// Row position outside the current document bounds.
    RowNotFound(usize),
    /// Column name not in the document's column set.
    ColumnNotFound(String),
    /// Missing or invalid required input (e.g. empty link-column list).
    Validation(String),
}

impl EngineError {
    /// Stable machine-readable code, used as-is on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::RowNotFound(_) | Self::ColumnNotFound(_) => "not_found",
            Self::Validation(_) => "validation",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::RowNotFound(position) => write!(f, "row {position} not found"),
            Self::ColumnNotFound(column) => write!(f, "column '{column}' not found"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
