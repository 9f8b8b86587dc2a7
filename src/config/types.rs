use serde::Deserialize;

/// Browser-like identification sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Hard ceiling on pages walked per category
pub const MAX_PAGES_CEILING: u32 = 25;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub requests: RequestConfig,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Landing page of the site; categories are discovered from here
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Request pacing and limits
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Reserved; the traversal engine issues one request at a time
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Pause between successive pages of one category (milliseconds)
    #[serde(
        rename = "delay-between-requests",
        default = "default_delay_between_requests"
    )]
    pub delay_between_requests: u64,

    /// Pause between successive categories (milliseconds)
    #[serde(
        rename = "delay-between-categories",
        default = "default_delay_between_categories"
    )]
    pub delay_between_categories: u64,

    /// Maximum pages walked per category
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

/// Which categories to harvest when the command line does not say
#[derive(Debug, Clone, Deserialize)]
pub struct ParsingConfig {
    /// Category names to harvest; empty means "decide by parse_entire_catalog"
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(rename = "parse-entire-catalog", default = "default_true")]
    pub parse_entire_catalog: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding spreadsheet artifacts and JSON files
    #[serde(rename = "output-directory", default = "default_output_directory")]
    pub output_directory: String,

    /// Fixed prefix of every artifact file name
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,

    /// Whether full and essential JSON files are written next to the artifact
    #[serde(rename = "save-json", default = "default_true")]
    pub save_json: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            max_concurrent_requests: default_max_concurrent_requests(),
            delay_between_requests: default_delay_between_requests(),
            delay_between_categories: default_delay_between_categories(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            parse_entire_catalog: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            file_prefix: default_file_prefix(),
            save_json: true,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_concurrent_requests() -> u32 {
    10
}

fn default_delay_between_requests() -> u64 {
    1000
}

fn default_delay_between_categories() -> u64 {
    3000
}

fn default_max_pages() -> u32 {
    MAX_PAGES_CEILING
}

fn default_output_directory() -> String {
    "parsed_data".to_string()
}

fn default_file_prefix() -> String {
    "olx".to_string()
}

fn default_true() -> bool {
    true
}
