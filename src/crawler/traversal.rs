//! Category Traversal Engine
//!
//! Walks one category page by page. Each fetched document is scanned
//! synchronously into an owned `PageScan` before the next await, so parsed
//! markup never lives across a suspension point.

use crate::config::{RequestConfig, MAX_PAGES_CEILING};
use crate::crawler::extractor::FieldExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::navigator::{NextPageLink, Navigator};
use crate::crawler::profile::{compile_selector, SiteProfile};
use crate::model::{Category, CategoryResultSet, Listing};
use crate::url::{resolve_href, with_page_param};
use crate::HarvestError;
use scraper::{Html, Selector};
use std::fmt;
use std::time::{Duration, Instant};

/// Pacing and bounds of one traversal
#[derive(Debug, Clone, Copy)]
pub struct TraversalSettings {
    /// Pause before every page after the first
    pub page_delay: Duration,
    /// Pages scanned before traversal stops regardless of the navigator,
    /// never more than `MAX_PAGES_CEILING`
    pub max_pages: u32,
}

impl TraversalSettings {
    pub fn from_config(config: &RequestConfig) -> Self {
        Self {
            page_delay: Duration::from_millis(config.delay_between_requests),
            max_pages: config.max_pages,
        }
    }
}

/// Why a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page could not be fetched; earlier pages are kept
    FetchFailed,
    /// No listing card matched either selector
    NoListings,
    /// Listing cards existed but none yielded a listing
    NoExtractableListings,
    /// The navigator found no next page
    LastPage,
    /// The page ceiling was reached
    PageLimit,
    /// The next page URL could not be built
    InvalidPageUrl,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::FetchFailed => "page could not be fetched",
            StopReason::NoListings => "no listings on page",
            StopReason::NoExtractableListings => "no extractable listings on page",
            StopReason::LastPage => "no next page",
            StopReason::PageLimit => "page limit reached",
            StopReason::InvalidPageUrl => "next page URL could not be built",
        };
        f.write_str(text)
    }
}

/// What one fetched page contained
#[derive(Debug, Default)]
pub struct PageScan {
    pub listings: Vec<Listing>,
    /// Listing cards found, extracted or not
    pub fragments: usize,
    /// Listing cards the extractor rejected
    pub rejected: usize,
    pub next: Option<NextPageLink>,
    /// Absolute "show all listings" URL, only looked for on a first page
    pub show_all: Option<String>,
}

#[derive(Debug)]
enum TraversalState {
    Fetching,
    RedirectedToFullListing(String),
    Extracting(PageScan),
    Advancing(Option<NextPageLink>),
    Done(StopReason),
}

#[derive(Debug)]
struct ListingLayout {
    card: Selector,
    card_fallback: Selector,
    show_all: Selector,
}

/// Drives fetcher, extractor and navigator across one category
#[derive(Debug)]
pub struct CategoryTraversal {
    fetcher: Fetcher,
    layout: ListingLayout,
    extractor: FieldExtractor,
    navigator: Navigator,
    base_url: String,
    locale: Option<String>,
    settings: TraversalSettings,
}

impl CategoryTraversal {
    pub fn new(
        fetcher: Fetcher,
        profile: &SiteProfile,
        base_url: impl Into<String>,
        settings: TraversalSettings,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            layout: ListingLayout {
                card: compile_selector(&profile.listing_card)?,
                card_fallback: compile_selector(&profile.listing_card_fallback)?,
                show_all: compile_selector(&profile.show_all_link)?,
            },
            extractor: FieldExtractor::new(profile)?,
            navigator: Navigator::new(profile)?,
            base_url: base_url.into(),
            locale: profile.locale.clone(),
            settings,
        })
    }

    pub fn settings(&self) -> TraversalSettings {
        self.settings
    }

    /// Page count that ends a traversal
    pub fn page_limit(&self) -> u32 {
        self.settings.max_pages.clamp(1, MAX_PAGES_CEILING)
    }

    /// Walks every page of a category
    ///
    /// Never fails: a fetch failure or an empty page ends the walk and the
    /// listings gathered so far are returned as a successful result.
    pub async fn run(&self, category: &Category) -> CategoryResultSet {
        let started = Instant::now();
        let mut result = CategoryResultSet::new(category.clone());

        let mut page: u32 = 1;
        let mut current_base = category.url.clone();
        let mut page_url = current_base.clone();
        let mut redirected = false;
        let mut state = TraversalState::Fetching;

        let reason = loop {
            state = match state {
                TraversalState::Fetching => {
                    tracing::info!("Parsing page {} of {}: {}", page, category.name, page_url);
                    let first_page = page == 1 && !redirected;

                    let scan = self
                        .fetcher
                        .fetch(&page_url)
                        .await
                        .map(|document| self.scan(&document, &category.name, first_page));

                    match scan {
                        None => TraversalState::Done(StopReason::FetchFailed),
                        Some(PageScan {
                            show_all: Some(url),
                            ..
                        }) => TraversalState::RedirectedToFullListing(url),
                        Some(scan) => TraversalState::Extracting(scan),
                    }
                }

                TraversalState::RedirectedToFullListing(url) => {
                    tracing::info!("Following full listing of {}: {} -> {}", category.name, current_base, url);
                    redirected = true;
                    current_base = url.clone();
                    page_url = url;
                    TraversalState::Fetching
                }

                TraversalState::Extracting(scan) => {
                    result.page_count += 1;
                    result.skipped_fragments += scan.rejected;

                    if scan.fragments == 0 {
                        tracing::warn!("No listings found on page {} of {}", page, category.name);
                        TraversalState::Done(StopReason::NoListings)
                    } else if scan.listings.is_empty() {
                        tracing::warn!(
                            "None of {} listing cards on page {} of {} could be extracted",
                            scan.fragments,
                            page,
                            category.name
                        );
                        TraversalState::Done(StopReason::NoExtractableListings)
                    } else {
                        tracing::info!("Page {}: found {} listings", page, scan.listings.len());
                        result.records.extend(scan.listings);
                        TraversalState::Advancing(scan.next)
                    }
                }

                TraversalState::Advancing(None) => TraversalState::Done(StopReason::LastPage),

                TraversalState::Advancing(Some(link)) => {
                    tracing::debug!(
                        "Next page link {:?} found via {}",
                        link.href.as_deref().unwrap_or("N/A"),
                        link.strategy
                    );

                    if page >= self.page_limit() {
                        TraversalState::Done(StopReason::PageLimit)
                    } else {
                        page += 1;
                        match with_page_param(&current_base, page) {
                            Ok(url) => {
                                page_url = url;
                                tokio::time::sleep(self.settings.page_delay).await;
                                TraversalState::Fetching
                            }
                            Err(e) => {
                                result.errors.push(format!("Cannot build URL of page {}: {}", page, e));
                                TraversalState::Done(StopReason::InvalidPageUrl)
                            }
                        }
                    }
                }

                TraversalState::Done(reason) => break reason,
            };
        };

        result.category.product_count = result.records.len() as u64;
        result.elapsed = started.elapsed();

        tracing::info!(
            "Category {} done ({}): {} listings from {} pages in {:.1}s",
            category.name,
            reason,
            result.records.len(),
            result.page_count,
            result.elapsed.as_secs_f64()
        );

        result
    }

    /// Scans one document into owned results
    pub fn scan(&self, document: &Html, category: &str, first_page: bool) -> PageScan {
        if first_page {
            let show_all = document
                .select(&self.layout.show_all)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(|href| resolve_href(href, &self.base_url, self.locale.as_deref()));

            if show_all.is_some() {
                return PageScan {
                    show_all,
                    ..PageScan::default()
                };
            }
        }

        let mut cards: Vec<_> = document.select(&self.layout.card).collect();
        if cards.is_empty() {
            cards = document.select(&self.layout.card_fallback).collect();
        }

        let mut scan = PageScan {
            fragments: cards.len(),
            ..PageScan::default()
        };

        for card in cards {
            match self.extractor.extract(card, &self.base_url, category) {
                Ok(listing) => scan.listings.push(listing),
                Err(e) => {
                    tracing::debug!("Skipping listing card: {}", e);
                    scan.rejected += 1;
                }
            }
        }

        scan.next = self.navigator.next_page_link(document);
        scan
    }
}
