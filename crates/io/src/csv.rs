// CSV import/export against the document contract.
//
// Load is all-or-nothing: a malformed input fails before any document is
// constructed, so the caller's prior document is never partially replaced.
// Export is the inverse of load restricted to the data - stored column
// order as the field order, every current cell value exactly.

use std::fmt;
use std::io::Read;
use std::path::Path;

use linkgrid_engine::{Document, EngineError, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    /// Malformed CSV text (including "no column list").
    Parse(String),
    /// File read/write failure.
    Io(String),
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "CSV parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CsvError {}

impl From<EngineError> for CsvError {
    fn from(err: EngineError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Parse headered CSV text into a document.
///
/// The first record is the column list (insertion order preserved); every
/// following record becomes one row. Rows shorter than the header are
/// padded with empty strings, extra trailing fields are dropped. Blank
/// lines are skipped. Empty input has no column list and fails.
pub fn read_document(content: &str, source_name: &str) -> Result<Document, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::Parse(e.to_string()))?
        .iter()
        .map(String::from)
        .collect();

    let mut rows: Vec<Row> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| CsvError::Parse(e.to_string()))?;
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, field)| (column.clone(), field.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(Document::from_parts(columns, rows, source_name)?)
}

/// Read a file (UTF-8, falling back to Windows-1252 for Excel exports)
/// and parse it; the file name becomes the document's source name.
pub fn read_document_from_path(path: &Path) -> Result<Document, CsvError> {
    let content = read_file_as_utf8(path)?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_document(&content, &source_name)
}

fn read_file_as_utf8(path: &Path) -> Result<String, CsvError> {
    let mut file = std::fs::File::open(path).map_err(|e| CsvError::Io(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| CsvError::Io(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Serialize the document back to CSV text: header row in stored column
/// order, then each row's current values in that order.
pub fn write_document(document: &Document) -> Result<String, CsvError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(document.columns())
        .map_err(|e| CsvError::Io(e.to_string()))?;

    for row in document.all_rows() {
        let record: Vec<&str> = document
            .columns()
            .iter()
            .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| CsvError::Io(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Io(e.to_string()))
}
