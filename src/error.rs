use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads the two attendance sources, composes the report, or writes it.
///
/// Malformed attendance values are deliberately absent: they degrade to zero
/// inside the reconciler instead of aborting the run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading inputs or writing the report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the schema configuration file is not valid JSON, or when
    /// the summary cannot be serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when an input holds no tabular data at all.
    #[error("the uploaded file '{source_name}' is empty")]
    EmptyInput { source_name: String },

    /// Raised when the tabular structure cannot be parsed or lacks a
    /// required column.
    #[error("could not parse '{source_name}': {reason}")]
    MalformedInput { source_name: String, reason: String },

    /// Raised when neither plain UTF-8 nor UTF-8 with a byte-order mark
    /// decodes the input.
    #[error("'{source_name}' is not valid UTF-8 (also tried utf-8-sig)")]
    Encoding { source_name: String },

    /// Raised when an xlsx input does not contain a usable worksheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the meeting timestamp is missing or cannot be parsed.
    #[error("could not extract meeting date: {0}")]
    DateParse(String),

    /// Raised when the interactively entered in-person count is not a
    /// non-negative integer.
    #[error("invalid in-person attendance count '{0}'")]
    InvalidInPerson(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ReportError {
    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        ReportError::MalformedInput {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn empty(source_name: &str) -> Self {
        ReportError::EmptyInput {
            source_name: source_name.to_string(),
        }
    }
}
