//! Site profile: the markup knowledge of one listing platform
//!
//! The extractor, navigator, discovery, and traversal engine are generic;
//! everything they know about a concrete site's markup lives here.

use crate::HarvestError;
use regex::Regex;
use scraper::Selector;

/// Selectors and patterns describing one listing platform
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Locale path segment the platform prefixes its links with
    pub locale: Option<String>,

    /// Listing card on a category page
    pub listing_card: String,

    /// Looser structural selector tried when no listing card matches
    pub listing_card_fallback: String,

    /// Heading selectors tried in order for the listing name
    pub name_headings: Vec<String>,

    /// Currency symbols/codes that mark a price
    pub currency_markers: Vec<String>,

    /// Pattern matched against individual class names of price elements
    pub price_class_pattern: String,

    /// Pattern whose first capture group is the ad id inside a listing URL
    pub identifier_pattern: String,

    /// Alternation of "next page" labels in every language the site uses
    pub next_page_labels: String,

    /// Anchor carrying the platform's pagination-forward marker
    pub pagination_forward: String,

    /// Anchors styled with the platform's generated class names
    pub styled_anchor: String,

    /// "Show all listings" link present on some first category pages
    pub show_all_link: String,

    /// Container of the category menu on the landing page
    pub category_menu: String,

    /// Category link inside the menu container
    pub category_link: String,

    /// Element inside a category link holding its label
    pub category_label: Option<String>,
}

impl SiteProfile {
    /// Profile of the OLX.ua classifieds site
    pub fn olx() -> Self {
        Self {
            locale: Some("uk".to_string()),
            listing_card: r#"div[data-cy="l-card"]"#.to_string(),
            listing_card_fallback: r#"div[class*="css-"]"#.to_string(),
            name_headings: vec!["h6".to_string(), "h5".to_string(), "h4".to_string()],
            currency_markers: vec!["грн".to_string(), "₴".to_string(), "UAH".to_string()],
            price_class_pattern: "price|cost".to_string(),
            identifier_pattern: r"/obyavlenie/([^/?#]+)".to_string(),
            next_page_labels: "Наступна|Следующая|Next".to_string(),
            pagination_forward: r#"a[data-testid="pagination-forward"]"#.to_string(),
            styled_anchor: r#"a[class*="css-"]"#.to_string(),
            show_all_link: r#"a[data-testid="sub-cat-1-root-link"]"#.to_string(),
            category_menu: r#"div[data-testid="home-categories-menu-row"]"#.to_string(),
            category_link: r#"a[class*="css-"][href]"#.to_string(),
            category_label: Some("p".to_string()),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::olx()
    }
}

/// Compiles a CSS selector, keeping the offending text in the error
pub(crate) fn compile_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Compiles a case-insensitive label pattern
pub(crate) fn compile_label_pattern(labels: &str) -> Result<Regex, HarvestError> {
    Ok(Regex::new(&format!("(?i){}", labels))?)
}
