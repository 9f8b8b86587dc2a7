use crate::model::{Category, Listing};
use serde::Serialize;
use std::time::Duration;

/// Everything one category traversal produced
#[derive(Debug, Clone, Serialize)]
pub struct CategoryResultSet {
    pub category: Category,
    pub records: Vec<Listing>,
    /// Pages fetched and scanned, including the one that ended traversal
    pub page_count: u32,
    /// Category-scoped failures; empty on success
    pub errors: Vec<String>,
    /// Listing cards the extractor rejected
    pub skipped_fragments: usize,
    #[serde(rename = "parsing_time", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl CategoryResultSet {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            records: Vec::new(),
            page_count: 0,
            errors: Vec::new(),
            skipped_fragments: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Builds a result that failed before any page was scanned
    pub fn failed(category: Category, error: impl Into<String>) -> Self {
        let mut result = Self::new(category);
        result.errors.push(error.into());
        result
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_products(&self) -> usize {
        self.records.len()
    }
}

/// Aggregate of a whole-catalog run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogReport {
    pub results: Vec<CategoryResultSet>,
    pub categories_found: usize,
    /// Failures outside any single category (e.g. discovery)
    pub errors: Vec<String>,
    #[serde(rename = "parsing_time", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl CatalogReport {
    /// True only when no category and no catalog-level step failed
    pub fn success(&self) -> bool {
        self.errors.is_empty() && self.results.iter().all(CategoryResultSet::is_success)
    }

    pub fn total_products(&self) -> usize {
        self.results.iter().map(CategoryResultSet::total_products).sum()
    }

    pub fn failed_categories(&self) -> impl Iterator<Item = &CategoryResultSet> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Every error of the run, category errors prefixed by category name
    pub fn all_errors(&self) -> Vec<String> {
        let mut errors = self.errors.clone();
        for result in self.failed_categories() {
            for error in &result.errors {
                errors.push(format!("{}: {}", result.category.name, error));
            }
        }
        errors
    }
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
