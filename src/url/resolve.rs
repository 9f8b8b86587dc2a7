use url::Url;

/// Returns true if the href already carries an http(s) scheme
pub fn is_absolute(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolves an href found on a page into an absolute URL
///
/// # Resolution Rules
///
/// 1. Already absolute → returned unchanged
/// 2. Protocol-relative (`//host/...`) → the base scheme is prepended
/// 3. Root-relative (`/...`) → appended to the base; when the href starts
///    with `/<locale>/` and the base path also starts with that same
///    locale segment, the href's locale segment is dropped so the result
///    does not carry it twice
/// 4. Anything else → appended to the base with a separating slash
///
/// Rule 3 mirrors how the listing platform builds its links; it is not
/// general RFC 3986 resolution.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::resolve_href;
///
/// assert_eq!(
///     resolve_href("/uk/item", "https://site/uk", Some("uk")),
///     "https://site/uk/item"
/// );
/// assert_eq!(
///     resolve_href("/other/item", "https://site/uk", Some("uk")),
///     "https://site/uk/other/item"
/// );
/// ```
pub fn resolve_href(href: &str, base_url: &str, locale: Option<&str>) -> String {
    let href = href.trim();

    if is_absolute(href) {
        return href.to_string();
    }

    let base = base_url.trim_end_matches('/');

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = Url::parse(base_url)
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());
        return format!("{}://{}", scheme, rest);
    }

    if href.starts_with('/') {
        let mut path = href;

        if let Some(locale) = locale {
            let prefix = format!("/{}/", locale);
            if href.starts_with(&prefix) && base_has_locale(base_url, locale) {
                path = &href[prefix.len() - 1..];
                tracing::debug!("Dropped duplicated locale segment: {} -> {}", href, path);
            }
        }

        return format!("{}{}", base, path);
    }

    format!("{}/{}", base, href)
}

/// Checks whether the first path segment of the base URL is the locale
fn base_has_locale(base_url: &str, locale: &str) -> bool {
    Url::parse(base_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next().map(|s| s == locale))
        })
        .unwrap_or(false)
}
