//! Site adapters and run orchestration
//!
//! A `ListingSite` knows how to enumerate a platform's categories and how to
//! harvest one of them. The free functions here drive any adapter through a
//! sequential run: one category at a time, paced, with every category's
//! failure contained in its own result.

mod olx;

pub use olx::OlxSite;

use crate::config::ParsingConfig;
use crate::model::{CatalogReport, Category, CategoryResultSet};
use crate::HarvestError;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Capability interface of one classifieds platform
#[async_trait]
pub trait ListingSite: Send + Sync {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Categories offered by the landing page; empty is a valid answer
    async fn categories(&self) -> Vec<Category>;

    /// Every listing of one category
    async fn listings(&self, category: &Category) -> Result<CategoryResultSet, HarvestError>;
}

/// Harvests one category, turning any failure into a category-scoped error
pub async fn harvest_category(site: &dyn ListingSite, category: &Category) -> CategoryResultSet {
    tracing::info!("Harvesting category {} from {}", category.name, site.name());

    match site.listings(category).await {
        Ok(result) => {
            for error in &result.errors {
                tracing::error!("Category {}: {}", category.name, error);
            }
            result
        }
        Err(e) => {
            tracing::error!("Category {} failed: {}", category.name, e);
            CategoryResultSet::failed(category.clone(), e.to_string())
        }
    }
}

/// Harvests categories in order, pausing between them
///
/// `on_result` sees each result as soon as its category is done, so callers
/// can export incrementally instead of waiting for the whole run.
pub async fn harvest_categories<F>(
    site: &dyn ListingSite,
    categories: &[Category],
    category_delay: Duration,
    mut on_result: F,
) -> CatalogReport
where
    F: FnMut(&CategoryResultSet) + Send,
{
    let started = Instant::now();
    let mut report = CatalogReport {
        categories_found: categories.len(),
        ..CatalogReport::default()
    };

    for (index, category) in categories.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(category_delay).await;
        }

        tracing::info!("Category {}/{}: {}", index + 1, categories.len(), category.name);
        let result = harvest_category(site, category).await;
        on_result(&result);
        report.results.push(result);
    }

    report.elapsed = started.elapsed();
    tracing::info!(
        "Harvested {} listings from {} categories in {:.1}s",
        report.total_products(),
        report.results.len(),
        report.elapsed.as_secs_f64()
    );
    report
}

/// Discovers every category and harvests all of them
pub async fn harvest_catalog<F>(
    site: &dyn ListingSite,
    category_delay: Duration,
    on_result: F,
) -> CatalogReport
where
    F: FnMut(&CategoryResultSet) + Send,
{
    let categories = site.categories().await;
    if categories.is_empty() {
        tracing::warn!("No categories found on {}", site.name());
    }

    harvest_categories(site, &categories, category_delay, on_result).await
}

/// Why a category selection could not be honoured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Category index {index} is out of range (1..={available})")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("No categories selected: pass --category or --all, or enable parse-entire-catalog")]
    NothingSelected,
}

/// Picks the categories of a run
///
/// Precedence: `all`, then the `requested` names or 1-based indices, then
/// the configured category names, then `parse-entire-catalog`.
pub fn select_categories(
    available: &[Category],
    requested: &[String],
    all: bool,
    parsing: &ParsingConfig,
) -> Result<Vec<Category>, SelectionError> {
    if all {
        return Ok(available.to_vec());
    }

    let wanted = if !requested.is_empty() {
        requested
    } else if !parsing.categories.is_empty() {
        parsing.categories.as_slice()
    } else if parsing.parse_entire_catalog {
        return Ok(available.to_vec());
    } else {
        return Err(SelectionError::NothingSelected);
    };

    let mut selected: Vec<Category> = Vec::with_capacity(wanted.len());
    for choice in wanted {
        let category = find_category(available, choice)?;
        if !selected.iter().any(|c| c.name == category.name) {
            selected.push(category.clone());
        }
    }
    Ok(selected)
}

fn find_category<'a>(available: &'a [Category], choice: &str) -> Result<&'a Category, SelectionError> {
    let choice = choice.trim();

    if let Some(category) = available.iter().find(|c| c.name == choice) {
        return Ok(category);
    }

    match choice.parse::<usize>() {
        Ok(index) if index >= 1 && index <= available.len() => Ok(&available[index - 1]),
        Ok(index) => Err(SelectionError::IndexOutOfRange {
            index,
            available: available.len(),
        }),
        Err(_) => Err(SelectionError::UnknownCategory(choice.to_string())),
    }
}
