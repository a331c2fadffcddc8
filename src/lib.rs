//! Breadth-Crawler: a bounded breadth-first URL discovery crawler
//!
//! This crate fetches a frontier of URLs concurrently, extracts new URLs from
//! the response bodies with marker-based pattern matching, filters them against
//! acceptance rules and records every live URL in a flat text file, for a fixed
//! number of rounds.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot open record file {path}: {source}")]
    SinkUnavailable {
        path: String,
        source: std::io::Error,
    },

    #[error("No seed URLs given")]
    NoSeeds,

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, FetchResult, Liveness};
pub use output::{Record, RunStats};
pub use state::{CrawlPhase, DurableLedger};
pub use url::{extract, AcceptanceRule, Pattern};
