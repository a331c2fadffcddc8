use serde::Deserialize;
use std::time::Duration;

/// Fetches completing faster than this (seconds) never reached a real server
pub const DEFAULT_MIN_RESPONSE_TIME: f64 = 1e-4;

/// Number of fetch/extract rounds before the final fetch
pub const DEFAULT_MAX_ROUNDS: u32 = 4;

/// Pause between rounds (milliseconds)
pub const DEFAULT_ROUND_PAUSE_MS: u64 = 5_000;

/// Upper bound on a single wait of the fetch loop (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: u32 = 256;

/// Default record file, truncated at the start of every run
pub const DEFAULT_RECORDS_PATH: &str = "urls.txt";

/// Substrings that disqualify a candidate in generic mode
pub const DEFAULT_BLACKLIST: &[&str] = &[
    ".css", ".js", ".pdf", ".png", ".jpeg", ".jpg", ".gif", ".ico", "docx", "xlsx", "mailto:",
];

/// A candidate must contain one of these in generic mode
pub const DEFAULT_WHITELIST: &[&str] = &[".com", ".sg", ".net", ".co", ".org", ".me", ".load"];

/// Start markers scanned for in generic mode, in scan order
pub const DEFAULT_MARKERS: &[&str] = &["http://", "https://", "www."];

/// Characters ending a URL in generic mode
pub const DEFAULT_DELIMITERS: &str = "\"?#, )'<>\r\n\t";

/// Only bodies of these content types are scanned in generic mode
pub const DEFAULT_CONTENT_TYPES: &[&str] = &["text/html"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub acceptance: AcceptanceConfig,
}

/// Round loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Seed URLs forming the first frontier
    pub seeds: Vec<String>,

    /// Number of fetch/extract rounds; one final fetch follows them
    pub max_rounds: u32,

    /// Fixed pause between rounds (milliseconds)
    pub round_pause_ms: u64,

    /// Liveness threshold in seconds
    pub min_response_time: f64,

    /// Treat fetches that never produced an HTTP status as dead; when off,
    /// transport failures are judged by the timing threshold alone
    pub require_http_status: bool,

    /// Scan bodies of dead fetches for further URLs
    pub scan_dead_bodies: bool,
}

impl CrawlerConfig {
    pub fn round_pause(&self) -> Duration {
        Duration::from_millis(self.round_pause_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_pause_ms: DEFAULT_ROUND_PAUSE_MS,
            min_response_time: DEFAULT_MIN_RESPONSE_TIME,
            require_http_status: true,
            scan_dead_bodies: false,
        }
    }
}

/// Network engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Cap on a single wait for the next completed fetch (milliseconds)
    pub poll_interval_ms: u64,

    pub connect_timeout_secs: u64,

    /// Total time allowed for one request including the body
    pub request_timeout_secs: u64,

    /// Maximum number of requests in flight at once
    pub max_concurrent_fetches: u32,
}

impl FetchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    pub crawler_name: String,
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "BreadthCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the record file
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: DEFAULT_RECORDS_PATH.to_string(),
        }
    }
}

/// Acceptance rule selection, tagged by `mode`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AcceptanceConfig {
    /// Scheme/prefix markers with a blacklist and whitelist of substrings
    Generic(GenericRules),

    /// Fixed per-round path markers resolved against a base authority
    Structured(StructuredRules),
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self::Generic(GenericRules::default())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GenericRules {
    pub blacklist: Vec<String>,
    pub whitelist: Vec<String>,
    pub markers: Vec<String>,
    pub delimiters: String,

    /// Bodies are scanned only if their `Content-Type` contains one of
    /// these; empty scans every body
    pub content_types: Vec<String>,
}

impl Default for GenericRules {
    fn default() -> Self {
        Self {
            blacklist: to_strings(DEFAULT_BLACKLIST),
            whitelist: to_strings(DEFAULT_WHITELIST),
            markers: to_strings(DEFAULT_MARKERS),
            delimiters: DEFAULT_DELIMITERS.to_string(),
            content_types: to_strings(DEFAULT_CONTENT_TYPES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StructuredRules {
    /// Scheme and authority prepended to every extracted path
    pub base: String,

    /// Marker used in round N is `rounds[N - 1]`; the last entry repeats
    pub rounds: Vec<MarkerRule>,

    /// Content-type gate as in generic mode; off by default since
    /// structured sources are usually JSON
    #[serde(default)]
    pub content_types: Vec<String>,
}

/// A start marker and the characters that end a match
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkerRule {
    pub start: String,
    pub end: String,
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
