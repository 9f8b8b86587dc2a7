//! Full and essential JSON dumps of a category result

use crate::export::artifact::sanitize_file_component;
use crate::export::types::ExportResult;
use crate::model::{CategoryResultSet, EssentialListing};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which fields a JSON dump carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    /// The whole result set, every listing field included
    Full,
    /// Success flag, totals, errors, and the essential listing fields
    Essential,
}

impl JsonKind {
    fn suffix(self) -> &'static str {
        match self {
            JsonKind::Full => "full",
            JsonKind::Essential => "essential",
        }
    }
}

#[derive(Serialize)]
struct EssentialReport<'a> {
    success: bool,
    products: Vec<EssentialListing<'a>>,
    total_products: usize,
    parsing_time: f64,
    errors: &'a [String],
}

/// `<prefix>_<slug>_<kind>.json`, slug being the lowercased category name
///
/// ```
/// use listing_harvester::export::{json_file_name, JsonKind};
///
/// assert_eq!(json_file_name("olx", "Дім і сад", JsonKind::Full), "olx_дім_і_сад_full.json");
/// ```
pub fn json_file_name(prefix: &str, category: &str, kind: JsonKind) -> String {
    let slug = sanitize_file_component(&category.to_lowercase()).replace(' ', "_");
    format!("{}_{}_{}.json", prefix, slug, kind.suffix())
}

/// Writes one JSON dump of `result` into `directory`
pub fn save_json(
    result: &CategoryResultSet,
    directory: &Path,
    prefix: &str,
    kind: JsonKind,
) -> ExportResult<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(json_file_name(prefix, &result.category.name, kind));

    let body = match kind {
        JsonKind::Full => serde_json::to_string_pretty(result)?,
        JsonKind::Essential => serde_json::to_string_pretty(&EssentialReport {
            success: result.is_success(),
            products: result.records.iter().map(|r| r.essential()).collect(),
            total_products: result.total_products(),
            parsing_time: result.elapsed.as_secs_f64(),
            errors: &result.errors,
        })?,
    };

    std::fs::write(&path, body)?;
    tracing::info!("Saved {} JSON to {}", kind.suffix(), path.display());
    Ok(path)
}
