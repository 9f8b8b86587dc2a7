//! Pagination Navigator
//!
//! Decides whether a category page has a successor. Strategies are tried in
//! order and the first anchor found wins; finding none is the normal end of
//! a traversal.

use crate::crawler::profile::{compile_label_pattern, compile_selector, SiteProfile};
use crate::url::page_number;
use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// The anchor chosen as "next page"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPageLink {
    /// Raw `href` of the anchor, if it had one
    pub href: Option<String>,
    /// Name of the strategy that found it
    pub strategy: &'static str,
}

type NextPageStrategy = for<'a> fn(&Navigator, &'a Html) -> Option<ElementRef<'a>>;

const STRATEGIES: &[(&str, NextPageStrategy)] = &[
    ("label-text", Navigator::by_label_text),
    ("aria-label", Navigator::by_aria_label),
    ("pagination-marker", Navigator::by_pagination_marker),
    ("styled-label", Navigator::by_styled_label),
    ("page-param", Navigator::by_page_param),
];

#[derive(Debug)]
pub struct Navigator {
    anchor: Selector,
    labelled_anchor: Selector,
    linked_anchor: Selector,
    pagination_forward: Selector,
    styled_anchor: Selector,
    next_label: Regex,
}

impl Navigator {
    pub fn new(profile: &SiteProfile) -> Result<Self, HarvestError> {
        Ok(Self {
            anchor: compile_selector("a")?,
            labelled_anchor: compile_selector("a[aria-label]")?,
            linked_anchor: compile_selector("a[href]")?,
            pagination_forward: compile_selector(&profile.pagination_forward)?,
            styled_anchor: compile_selector(&profile.styled_anchor)?,
            next_label: compile_label_pattern(&profile.next_page_labels)?,
        })
    }

    /// Finds the link to the next page, if the document has one
    pub fn next_page_link(&self, document: &Html) -> Option<NextPageLink> {
        let found = STRATEGIES
            .iter()
            .find_map(|(strategy, find)| find(self, document).map(|anchor| (*strategy, anchor)))
            .or_else(|| self.by_any_later_page(document).map(|a| ("later-page-scan", a)));

        let (strategy, anchor) = found?;
        tracing::debug!("Next page link found via {}", strategy);

        Some(NextPageLink {
            href: anchor.value().attr("href").map(str::to_string),
            strategy,
        })
    }

    fn has_next_label(&self, anchor: &ElementRef<'_>) -> bool {
        self.next_label.is_match(&anchor.text().collect::<String>())
    }

    fn by_label_text<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document
            .select(&self.anchor)
            .find(|a| self.has_next_label(a))
    }

    fn by_aria_label<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.labelled_anchor).find(|a| {
            a.value()
                .attr("aria-label")
                .is_some_and(|label| self.next_label.is_match(label))
        })
    }

    fn by_pagination_marker<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.pagination_forward).next()
    }

    fn by_styled_label<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document
            .select(&self.styled_anchor)
            .find(|a| self.has_next_label(a))
    }

    fn by_page_param<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document
            .select(&self.linked_anchor)
            .find(|a| a.value().attr("href").and_then(page_number).is_some())
    }

    /// Last resort: any anchor pointing past the first page
    fn by_any_later_page<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.linked_anchor).find(|a| {
            a.value()
                .attr("href")
                .and_then(page_number)
                .is_some_and(|page| page > 1)
        })
    }
}
