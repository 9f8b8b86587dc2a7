//! Field Extractor: one listing card in, one listing out
//!
//! Listing cards do not reliably expose semantic fields, so every field is
//! found by an ordered list of independent strategies where the first match
//! wins. A card missing a name or a link is rejected with an `ExtractError`
//! so callers can log it and carry on with the rest of the page.

use crate::crawler::profile::{compile_selector, SiteProfile};
use crate::model::{Listing, Price};
use crate::text::clean_text;
use crate::url::resolve_href;
use crate::HarvestError;
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Run of digits optionally grouped by spaces or commas
const AMOUNT_PATTERN: &str = r"\d+(?:[\s,]*\d+)*";

/// Why a listing card was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("listing card has no name")]
    MissingName,

    #[error("listing card '{name}' has no usable link")]
    MissingUrl { name: String },
}

type PriceStrategy = fn(&FieldExtractor, ElementRef<'_>) -> Option<String>;

/// Price text strategies, loosest last
const PRICE_STRATEGIES: &[(&str, PriceStrategy)] = &[
    ("currency-text", FieldExtractor::price_from_currency_text),
    ("price-class", FieldExtractor::price_from_class),
    ("numeric-text", FieldExtractor::price_from_numbers),
];

/// Heuristic extractor for listing cards
#[derive(Debug)]
pub struct FieldExtractor {
    headings: Vec<Selector>,
    link: Selector,
    currency_markers: Vec<String>,
    price_class: Regex,
    amount: Regex,
    amount_with_currency: Regex,
    identifier: Regex,
    locale: Option<String>,
}

impl FieldExtractor {
    /// Compiles the extractor from a site profile
    pub fn new(profile: &SiteProfile) -> Result<Self, HarvestError> {
        let headings = profile
            .name_headings
            .iter()
            .map(|h| compile_selector(h))
            .collect::<Result<Vec<_>, _>>()?;

        let markers = profile
            .currency_markers
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            headings,
            link: compile_selector("a[href]")?,
            currency_markers: profile.currency_markers.clone(),
            price_class: Regex::new(&profile.price_class_pattern)?,
            amount: Regex::new(AMOUNT_PATTERN)?,
            amount_with_currency: Regex::new(&format!(r"({})\s*(?:{})", AMOUNT_PATTERN, markers))?,
            identifier: Regex::new(&profile.identifier_pattern)?,
            locale: profile.locale.clone(),
        })
    }

    /// Extracts one listing from a listing card
    ///
    /// # Arguments
    ///
    /// * `fragment` - The listing card element
    /// * `base_url` - Site base URL used to resolve relative links
    /// * `category` - Name of the category being traversed
    ///
    /// # Returns
    ///
    /// * `Ok(Listing)` - Card had a name and a link
    /// * `Err(ExtractError)` - Card rejected; nothing else on the page is affected
    pub fn extract(
        &self,
        fragment: ElementRef<'_>,
        base_url: &str,
        category: &str,
    ) -> Result<Listing, ExtractError> {
        let name = self.extract_name(fragment).ok_or(ExtractError::MissingName)?;

        let price = self
            .extract_price_text(fragment)
            .and_then(|text| self.parse_price(&text))
            .map(Price::new)
            .unwrap_or_else(Price::zero);

        let product_url = self
            .extract_url(fragment, base_url)
            .ok_or_else(|| ExtractError::MissingUrl { name: name.clone() })?;

        let identifier = self.identifier(&product_url);

        Ok(Listing {
            name,
            price,
            product_url,
            // Listing cards carry no out-of-stock signal
            availability: true,
            identifier,
            category: category.to_string(),
            parsed_at: Utc::now(),
        })
    }

    /// Name from the first heading found, else from the first link
    fn extract_name(&self, fragment: ElementRef<'_>) -> Option<String> {
        let element = self
            .headings
            .iter()
            .find_map(|selector| fragment.select(selector).next())
            .or_else(|| fragment.select(&self.link).next())?;

        let name = clean_text(&element.text().collect::<String>());
        (!name.is_empty()).then_some(name)
    }

    /// Raw price text from the first strategy that finds any
    fn extract_price_text(&self, fragment: ElementRef<'_>) -> Option<String> {
        PRICE_STRATEGIES.iter().find_map(|(strategy, find)| {
            let text = find(self, fragment)?;
            tracing::trace!("Price text via {}: {:?}", strategy, text);
            Some(text)
        })
    }

    /// First text node mentioning a currency marker
    fn price_from_currency_text(&self, fragment: ElementRef<'_>) -> Option<String> {
        fragment
            .text()
            .filter(|text| !text.trim().is_empty())
            .find(|text| self.currency_markers.iter().any(|m| text.contains(m.as_str())))
            .map(str::to_string)
    }

    /// Text of the first descendant whose class looks like a price
    ///
    /// An empty price placeholder yields nothing so later strategies run.
    fn price_from_class(&self, fragment: ElementRef<'_>) -> Option<String> {
        fragment
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().classes().any(|class| self.price_class.is_match(class)))
            .map(|el| el.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
    }

    /// Number in the card's full text, preferably one followed by a currency
    fn price_from_numbers(&self, fragment: ElementRef<'_>) -> Option<String> {
        let text = fragment.text().collect::<Vec<_>>().join(" ");

        if let Some(m) = self.amount_with_currency.find(&text) {
            return Some(m.as_str().to_string());
        }

        let first_marker = self.currency_markers.first().map(String::as_str).unwrap_or("");
        self.amount
            .find(&text)
            .map(|m| format!("{} {}", m.as_str(), first_marker))
    }

    /// Parses a price text into whole currency units
    ///
    /// Currency markers are stripped, then the first run of digits (with
    /// optional space or comma thousands separators) is read.
    pub fn parse_price(&self, price_text: &str) -> Option<u64> {
        let mut text = price_text.to_string();
        for marker in &self.currency_markers {
            text = text.replace(marker.as_str(), "");
        }
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        let Some(m) = self.amount.find(text) else {
            tracing::warn!("Could not parse price from {:?}", price_text);
            return None;
        };

        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        match digits.parse::<u64>() {
            Ok(amount) => Some(amount),
            Err(e) => {
                tracing::warn!("Could not parse price from {:?}: {}", price_text, e);
                None
            }
        }
    }

    /// First non-fragment link, resolved against the site base
    fn extract_url(&self, fragment: ElementRef<'_>, base_url: &str) -> Option<String> {
        fragment
            .select(&self.link)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty() && !href.starts_with('#'))
            .map(|href| resolve_href(href, base_url, self.locale.as_deref()))
    }

    /// Site-assigned ad id carried by a listing URL, or empty
    pub fn identifier(&self, product_url: &str) -> String {
        self.identifier
            .captures(product_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }
}
