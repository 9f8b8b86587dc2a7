//! URL handling module for the harvester
//!
//! This module provides href resolution against a site base URL and the
//! page-number query handling used by the traversal engine.

mod pagination;
mod resolve;

// Re-export main functions
pub use pagination::{page_number, with_page_param};
pub use resolve::{is_absolute, resolve_href};
