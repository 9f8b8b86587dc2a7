use std::path::PathBuf;
use thiserror::Error;

/// Export-specific errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No records to export for category '{category}'")]
    NoRecords { category: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read spreadsheet {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Cannot build row for '{name}': {reason}")]
    Row { name: String, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// What one export call did to its artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    /// True when no usable artifact existed and a new file was written
    pub created: bool,
    pub added: usize,
    pub duplicates: usize,
    /// Records skipped because their row could not be built
    pub failed_rows: usize,
    /// Data rows in the category sheet after the export
    pub total_rows: usize,
}
