//! Artifact naming and lookup
//!
//! Artifacts are named `<prefix>_<category>_<YYYYMMDD_HHMMSS>.xlsx`. Lookup
//! accepts only names that parse back into exactly that shape and prefers
//! the newest timestamp, so the choice never depends on directory order.

use crate::export::types::ExportResult;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// `chrono` format of the timestamp embedded in artifact names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const ARTIFACT_EXTENSION: &str = "xlsx";

/// Longest sheet name a spreadsheet accepts
pub const MAX_SHEET_NAME_CHARS: usize = 31;

const SHEET_NAME_FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '[', ']'];
const FILE_NAME_FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '[', ']', '<', '>', '|', '"'];

/// Makes a category name usable as a sheet name
///
/// Forbidden characters become `_` and the result is cut to 31 characters.
///
/// ```
/// use listing_harvester::export::sanitize_sheet_name;
///
/// assert_eq!(sanitize_sheet_name("Дім/сад: [нове]"), "Дім_сад_ _нове_");
/// ```
pub fn sanitize_sheet_name(name: &str) -> String {
    let mut sheet: String = name
        .chars()
        .map(|c| if SHEET_NAME_FORBIDDEN.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_CHARS)
        .collect();

    // Sheet names may not start or end with an apostrophe
    if sheet.starts_with('\'') {
        sheet.replace_range(..1, "_");
    }
    if sheet.ends_with('\'') {
        sheet.pop();
        sheet.push('_');
    }

    if sheet.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        sheet
    }
}

/// Makes a category name usable inside a file name
pub fn sanitize_file_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if FILE_NAME_FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// File name of an artifact created at `timestamp`
pub fn artifact_file_name(prefix: &str, category: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        sanitize_file_component(category),
        timestamp.format(TIMESTAMP_FORMAT),
        ARTIFACT_EXTENSION
    )
}

/// Path of a brand-new artifact stamped with the current local time
pub fn new_artifact_path(directory: &Path, prefix: &str, category: &str) -> PathBuf {
    directory.join(artifact_file_name(prefix, category, &Local::now().naive_local()))
}

/// Timestamp embedded in an artifact name, if the name belongs to this category
pub fn artifact_timestamp(file_name: &str, prefix: &str, category: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(&format!(".{}", ARTIFACT_EXTENSION))?;
    let head = format!("{}_{}_", prefix, sanitize_file_component(category));
    let stamp = stem.strip_prefix(&head)?;

    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Finds the newest artifact of a category in `directory`
///
/// Returns `Ok(None)` when the directory does not exist or holds no
/// artifact for the category. Equal timestamps are broken by file name.
pub fn find_existing_artifact(
    directory: &Path,
    prefix: &str,
    category: &str,
) -> ExportResult<Option<PathBuf>> {
    if !directory.is_dir() {
        return Ok(None);
    }

    let mut best: Option<(NaiveDateTime, String, PathBuf)> = None;

    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(timestamp) = artifact_timestamp(&file_name, prefix, category) else {
            continue;
        };

        let newer = match &best {
            None => true,
            Some((best_ts, best_name, _)) => (timestamp, &file_name) > (*best_ts, best_name),
        };
        if newer {
            best = Some((timestamp, file_name, entry.path()));
        }
    }

    if let Some((_, name, _)) = &best {
        tracing::debug!("Existing artifact for {}: {}", category, name);
    }

    Ok(best.map(|(_, _, path)| path))
}
