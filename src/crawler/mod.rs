//! Listing-extraction engine
//!
//! This module contains the scraping side of the harvester:
//! - HTTP fetching with a browser-like identification
//! - Heuristic field extraction from listing cards
//! - Next-page detection and the page-by-page category traversal
//! - Category discovery from the landing page menu
//!
//! Everything site-specific is described by a `SiteProfile`.

mod discovery;
mod extractor;
mod fetcher;
mod navigator;
mod profile;
mod traversal;

pub use discovery::{discover_categories, CategoryMenu};
pub use extractor::{ExtractError, FieldExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher};
pub use navigator::{Navigator, NextPageLink};
pub use profile::SiteProfile;
pub use traversal::{CategoryTraversal, PageScan, StopReason, TraversalSettings};
