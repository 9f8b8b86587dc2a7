//! Text helpers shared by extraction and export

/// Trims and collapses every run of whitespace into a single space
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identity key of a listing name: lowercase with collapsed whitespace
///
/// Two listings whose names share this key are the same product as far as
/// the spreadsheet artifact is concerned.
pub fn normalize_name(name: &str) -> String {
    clean_text(&name.to_lowercase())
}
