//! Export of harvested listings
//!
//! The spreadsheet artifact is the durable output: one file per category,
//! merged into on every run without duplicating a product. JSON dumps are a
//! per-run side output.

mod artifact;
mod dedup;
mod json;
mod types;
mod workbook;

pub use artifact::{
    artifact_file_name, artifact_timestamp, find_existing_artifact, sanitize_file_component,
    sanitize_sheet_name, TIMESTAMP_FORMAT,
};
pub use dedup::{
    DedupExporter, IdentityIndex, ListingRow, AVAILABLE_LABEL, MAX_CELL_CHARS, MAX_URL_CHARS,
    UNAVAILABLE_LABEL,
};
pub use json::{json_file_name, save_json, JsonKind};
pub use types::{ExportError, ExportResult, ExportSummary};
pub use workbook::{hyperlink_formula, ArtifactBook, CellValue, Sheet, LINK_LABEL, LISTING_HEADERS};
