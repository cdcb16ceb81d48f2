//! Ingestion error taxonomy.
//!
//! Only hard failures live here. A file that decodes but yields no dated
//! rows is a successful [`IngestOutcome::NoValidRows`](crate::pipeline::IngestOutcome)
//! and never an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Extension is not one of `.csv`, `.xls`, `.xlsx`.
    #[error("unsupported file type: '{0}' (expected .csv, .xls or .xlsx)")]
    UnsupportedFormat(String),

    /// The container (spreadsheet binary or delimited text) could not be parsed.
    #[error("could not decode file: {0}")]
    Decode(String),
}

impl From<calamine::Error> for IngestError {
    fn from(e: calamine::Error) -> Self {
        IngestError::Decode(e.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::Decode(e.to_string())
    }
}
