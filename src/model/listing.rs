use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Currency assumed when a listing does not say otherwise
pub const DEFAULT_CURRENCY: &str = "UAH";

/// A non-negative price in whole currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    pub amount: u64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: u64) -> Self {
        Self {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Price used when extraction found nothing parseable
    pub fn zero() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// One listing extracted from a listing card
///
/// `name` and `product_url` are never empty; the extractor rejects such
/// fragments instead of building a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub name: String,
    pub price: Price,
    pub product_url: String,
    pub availability: bool,
    /// Site-assigned ad id, empty when the URL does not carry one
    pub identifier: String,
    /// Name of the category the listing was found in
    pub category: String,
    pub parsed_at: DateTime<Utc>,
}

/// The subset of listing fields written to the essential JSON export
#[derive(Debug, Clone, Serialize)]
pub struct EssentialListing<'a> {
    pub name: &'a str,
    pub price: String,
    pub product_url: &'a str,
    pub availability: bool,
    pub identifier: &'a str,
}

impl Listing {
    pub fn essential(&self) -> EssentialListing<'_> {
        EssentialListing {
            name: &self.name,
            price: self.price.amount.to_string(),
            product_url: &self.product_url,
            availability: self.availability,
            identifier: &self.identifier,
        }
    }
}
