use crate::UrlError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

static RE_PAGE_PARAM: OnceLock<Regex> = OnceLock::new();

fn page_param_regex() -> &'static Regex {
    RE_PAGE_PARAM.get_or_init(|| Regex::new(r"(?:^|[?&])page=(\d+)").unwrap())
}

/// Builds the URL of a given page by setting the `page` query parameter
///
/// Any existing `page` parameter is replaced; other parameters are kept in
/// their original order.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::with_page_param;
///
/// let url = with_page_param("https://site/uk/list/?search=tv", 3).unwrap();
/// assert_eq!(url, "https://site/uk/list/?search=tv&page=3");
/// ```
pub fn with_page_param(base_url: &str, page: u32) -> Result<String, UrlError> {
    let mut url = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("page", &page.to_string());

    Ok(url.to_string())
}

/// Extracts the page number carried by an href, if any
pub fn page_number(href: &str) -> Option<u32> {
    page_param_regex()
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
