//! Category Discovery: enumerates categories from the landing page menu

use crate::crawler::fetcher::Fetcher;
use crate::crawler::profile::{compile_selector, SiteProfile};
use crate::model::Category;
use crate::text::clean_text;
use crate::url::{is_absolute, resolve_href};
use crate::HarvestError;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Labels this short are icons or counters, not category names
const MIN_LABEL_CHARS: usize = 3;

#[derive(Debug)]
pub struct CategoryMenu {
    container: Selector,
    link: Selector,
    label: Option<Selector>,
    locale: Option<String>,
}

impl CategoryMenu {
    pub fn new(profile: &SiteProfile) -> Result<Self, HarvestError> {
        Ok(Self {
            container: compile_selector(&profile.category_menu)?,
            link: compile_selector(&profile.category_link)?,
            label: profile
                .category_label
                .as_deref()
                .map(compile_selector)
                .transpose()?,
            locale: profile.locale.clone(),
        })
    }

    /// Reads categories out of a landing page
    ///
    /// Only internal links with a label longer than two characters qualify.
    /// A missing menu container yields an empty list.
    pub fn parse_categories(&self, document: &Html, base_url: &str) -> Vec<Category> {
        let Some(container) = document.select(&self.container).next() else {
            tracing::warn!("Category menu not found on {}", base_url);
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for link in container.select(&self.link) {
            let Some(href) = link.value().attr("href").map(str::trim) else {
                continue;
            };

            let label_text = self
                .label
                .as_ref()
                .and_then(|label| link.select(label).next())
                .map(|el| el.text().collect::<String>())
                .unwrap_or_else(|| link.text().collect());
            let name = clean_text(&label_text);

            if name.chars().count() < MIN_LABEL_CHARS || href.is_empty() || is_absolute(href) {
                continue;
            }

            if !seen.insert(name.clone()) {
                continue;
            }

            let url = resolve_href(href, base_url, self.locale.as_deref());
            tracing::debug!("Category {:?} -> {}", name, url);
            categories.push(Category::new(name, url));
        }

        categories
    }
}

/// Fetches the landing page and lists its categories
///
/// A failed fetch is logged by the fetcher and yields an empty list.
pub async fn discover_categories(
    fetcher: &Fetcher,
    menu: &CategoryMenu,
    base_url: &str,
) -> Vec<Category> {
    let categories = match fetcher.fetch(base_url).await {
        Some(document) => menu.parse_categories(&document, base_url),
        None => Vec::new(),
    };

    tracing::info!("Discovered {} categories at {}", categories.len(), base_url);
    categories
}
