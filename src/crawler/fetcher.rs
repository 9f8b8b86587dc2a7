//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the HTTP client with a browser-like identification
//! - Single-attempt GET requests with a bounded timeout
//! - Classifying failures and turning them into "no page"
//!
//! There is no retry: a failed fetch ends whatever traversal depends on it.

use crate::config::RequestConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Upper bound for one whole request
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::DEFAULT_USER_AGENT;
/// use listing_harvester::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(DEFAULT_USER_AGENT, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("uk-UA,uk;q=0.9,en;q=0.8"),
    );

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and classifies the outcome
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}

/// Page Fetcher: turns a URL into a parsed document or nothing
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher from the request settings and User-Agent
    pub fn new(config: &RequestConfig, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, Duration::from_secs(config.request_timeout))?;
        Ok(Self { client })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches and parses a page
    ///
    /// Returns `None` for any non-success status or transport failure; the
    /// failure is logged, never raised.
    pub async fn fetch(&self, url: &str) -> Option<Html> {
        match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                tracing::debug!(
                    "Fetched {} (HTTP {}, {} bytes, final URL {})",
                    url,
                    status_code,
                    body.len(),
                    final_url
                );
                Some(Html::parse_document(&body))
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("HTTP {} for {}", status_code, url);
                None
            }
            FetchResult::NetworkError { error } => {
                tracing::error!("Failed to fetch {}: {}", url, error);
                None
            }
        }
    }
}
