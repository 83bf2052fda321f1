//! Spreadsheet intake for client batches.
//!
//! The spreadsheet is read as a CSV export. Header validation happens before
//! any row is looked at, so a file missing a required column is rejected as a
//! whole; row-level problems are carried per row for the caller to skip.

mod parser;

pub use parser::{read_sheet, SheetRow, REQUIRED_COLUMNS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileFormatError {
    #[error("missing required column '{0}' in the client spreadsheet")]
    MissingColumn(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum BatchImportError {
    #[error("failed to read client spreadsheet: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid client spreadsheet data: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),
}
