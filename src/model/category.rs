use serde::Serialize;

/// A navigable category of the site
///
/// Identity is the name; two categories of the same site never share one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Absolute URL of the category's first listing page
    pub url: String,
    pub product_count: u64,
}

impl Category {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            product_count: 0,
        }
    }
}
