//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; missing keys fall back to the defaults in [`types`].
//!
//! # Example
//!
//! ```no_run
//! use breadth_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will run {} rounds", config.crawler.max_rounds);
//! ```

mod parser;
pub mod types;
mod validation;

// Re-export types
pub use types::{
    AcceptanceConfig, Config, CrawlerConfig, FetchConfig, GenericRules, MarkerRule, OutputConfig,
    StructuredRules, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
