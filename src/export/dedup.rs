//! Deduplicating Exporter
//!
//! Merges listings into the category's artifact. The identity index is
//! rebuilt from the artifact on every call and never stored anywhere else,
//! so the file on disk is the only state shared between runs.
//!
//! Exports are read-modify-write without locking: two processes exporting
//! the same category at once can lose rows. Callers must serialize them.

use crate::config::OutputConfig;
use crate::export::artifact::{find_existing_artifact, new_artifact_path, sanitize_sheet_name};
use crate::export::types::{ExportError, ExportResult, ExportSummary};
use crate::export::workbook::{ArtifactBook, CellValue, Sheet, LINK_LABEL};
use crate::model::Listing;
use crate::text::normalize_name;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Longest text a spreadsheet cell holds
pub const MAX_CELL_CHARS: usize = 32_767;

/// Longest URL a spreadsheet link accepts
pub const MAX_URL_CHARS: usize = 2_079;

pub const AVAILABLE_LABEL: &str = "✅ В наявності";
pub const UNAVAILABLE_LABEL: &str = "❌ Немає в наявності";

/// Normalized names already present in a sheet
#[derive(Debug, Default)]
pub struct IdentityIndex {
    names: HashSet<String>,
}

impl IdentityIndex {
    /// Collects the identity keys of every data row (first column)
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let names = sheet
            .data_rows()
            .iter()
            .filter_map(|row| row.first())
            .filter_map(CellValue::display_text)
            .map(|name| normalize_name(&name))
            .filter(|key| !key.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.contains(key)
    }

    /// Adds a key; false if it was already present
    pub fn insert(&mut self, key: String) -> bool {
        self.names.insert(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The four cells of one listing row
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub name: String,
    pub price: String,
    pub availability: &'static str,
    pub product_url: String,
}

impl TryFrom<&Listing> for ListingRow {
    type Error = ExportError;

    fn try_from(listing: &Listing) -> Result<Self, Self::Error> {
        let row_error = |reason: String| ExportError::Row {
            name: listing.name.chars().take(80).collect(),
            reason,
        };

        let name_chars = listing.name.chars().count();
        if name_chars > MAX_CELL_CHARS {
            return Err(row_error(format!(
                "name is {} characters, the cell limit is {}",
                name_chars, MAX_CELL_CHARS
            )));
        }

        let url_chars = listing.product_url.chars().count();
        if url_chars == 0 {
            return Err(row_error("product URL is empty".to_string()));
        }
        if url_chars > MAX_URL_CHARS {
            return Err(row_error(format!(
                "product URL is {} characters, the link limit is {}",
                url_chars, MAX_URL_CHARS
            )));
        }

        Ok(Self {
            name: listing.name.clone(),
            price: listing.price.amount.to_string(),
            availability: if listing.availability {
                AVAILABLE_LABEL
            } else {
                UNAVAILABLE_LABEL
            },
            product_url: listing.product_url.clone(),
        })
    }
}

impl ListingRow {
    pub fn into_cells(self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.name),
            CellValue::Text(self.price),
            CellValue::text(self.availability),
            CellValue::Link {
                url: self.product_url,
                label: LINK_LABEL.to_string(),
            },
        ]
    }
}

/// Exports listings into per-category artifacts under one directory
#[derive(Debug, Clone)]
pub struct DedupExporter {
    output_directory: PathBuf,
    file_prefix: String,
}

impl DedupExporter {
    pub fn new(output_directory: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_directory: output_directory.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.output_directory, &config.file_prefix)
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Merges `records` into the artifact of `category`
    ///
    /// Records whose normalized name is already in the sheet (or earlier in
    /// `records`) are skipped. Existing rows are never changed. A record whose
    /// row cannot be built is logged and skipped.
    ///
    /// # Errors
    ///
    /// * `ExportError::NoRecords` - `records` is empty; nothing is written
    /// * `ExportError::Io` / `ExportError::Xlsx` - the artifact could not be written
    pub fn export(&self, records: &[Listing], category: &str) -> ExportResult<ExportSummary> {
        if records.is_empty() {
            return Err(ExportError::NoRecords {
                category: category.to_string(),
            });
        }

        std::fs::create_dir_all(&self.output_directory)?;

        let (mut book, path, created) = self.open_artifact(category)?;
        let (sheet, initialized) = book.listing_sheet_mut(&sanitize_sheet_name(category));
        let mut index = IdentityIndex::from_sheet(sheet);
        tracing::debug!("Artifact {} holds {} known listings", path.display(), index.len());

        let mut added = 0;
        let mut duplicates = 0;
        let mut failed_rows = 0;

        for record in records {
            let key = normalize_name(&record.name);
            if index.contains(&key) {
                tracing::debug!("Skipping duplicate: {}", record.name);
                duplicates += 1;
                continue;
            }

            match ListingRow::try_from(record) {
                Ok(row) => {
                    sheet.push_row(row.into_cells());
                    index.insert(key);
                    added += 1;
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    failed_rows += 1;
                }
            }
        }

        let total_rows = sheet.data_rows().len();

        if created || initialized || added > 0 {
            book.save(&path)?;
        } else {
            tracing::debug!("Nothing new for {}; {} left untouched", category, path.display());
        }

        tracing::info!(
            "Exported {}: {} added, {} duplicates, {} failed, {} rows in {}",
            category,
            added,
            duplicates,
            failed_rows,
            total_rows,
            path.display()
        );

        Ok(ExportSummary {
            path,
            created,
            added,
            duplicates,
            failed_rows,
            total_rows,
        })
    }

    /// Loads the category's newest artifact, or starts a new one
    fn open_artifact(&self, category: &str) -> ExportResult<(ArtifactBook, PathBuf, bool)> {
        let new_path = || new_artifact_path(&self.output_directory, &self.file_prefix, category);

        let Some(path) = find_existing_artifact(&self.output_directory, &self.file_prefix, category)?
        else {
            return Ok((ArtifactBook::new(), new_path(), true));
        };

        match ArtifactBook::read(&path) {
            Ok(book) => {
                tracing::info!("Updating existing artifact {}", path.display());
                Ok((book, path, false))
            }
            Err(e) => {
                tracing::warn!("{}; starting a new artifact", e);
                Ok((ArtifactBook::new(), new_path(), true))
            }
        }
    }
}
