use crate::config::Config;
use crate::crawler::{
    discover_categories, CategoryMenu, CategoryTraversal, Fetcher, SiteProfile, TraversalSettings,
};
use crate::model::{Category, CategoryResultSet};
use crate::site::ListingSite;
use crate::HarvestError;
use async_trait::async_trait;

/// Adapter for OLX.ua
#[derive(Debug)]
pub struct OlxSite {
    base_url: String,
    fetcher: Fetcher,
    menu: CategoryMenu,
    traversal: CategoryTraversal,
}

impl OlxSite {
    /// Builds the adapter from the run configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use listing_harvester::config::load_config;
    /// use listing_harvester::{ListingSite, OlxSite};
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("harvester.toml"))?;
    /// let site = OlxSite::new(&config)?;
    /// for category in site.categories().await {
    ///     println!("{}", category.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        Self::with_profile(config, &SiteProfile::olx())
    }

    /// Builds an adapter for a site that shares OLX's layout but not its markup details
    pub fn with_profile(config: &Config, profile: &SiteProfile) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config.requests, &config.site.user_agent)?;
        let base_url = config.site.base_url.clone();

        Ok(Self {
            menu: CategoryMenu::new(profile)?,
            traversal: CategoryTraversal::new(
                fetcher.clone(),
                profile,
                base_url.clone(),
                TraversalSettings::from_config(&config.requests),
            )?,
            fetcher,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ListingSite for OlxSite {
    fn name(&self) -> &str {
        "OLX.ua"
    }

    async fn categories(&self) -> Vec<Category> {
        discover_categories(&self.fetcher, &self.menu, &self.base_url).await
    }

    async fn listings(&self, category: &Category) -> Result<CategoryResultSet, HarvestError> {
        Ok(self.traversal.run(category).await)
    }
}
