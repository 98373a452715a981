// CSV-shaped I/O for LinkGrid documents.

pub mod csv;

pub use crate::csv::{read_document, read_document_from_path, write_document, CsvError};
