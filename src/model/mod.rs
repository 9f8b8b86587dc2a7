//! Data model for harvested categories and listings
//!
//! # Components
//!
//! - `Category`: one navigable category discovered on the landing page
//! - `Listing`: one extracted listing card (name, price, URL, availability, id)
//! - `CategoryResultSet`: everything one category traversal produced
//! - `CatalogReport`: the aggregate of a whole-catalog run

mod category;
mod listing;
mod result;

// Re-export main types
pub use category::Category;
pub use listing::{EssentialListing, Listing, Price, DEFAULT_CURRENCY};
pub use result::{CatalogReport, CategoryResultSet};
