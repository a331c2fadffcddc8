//! Crawler module for round-based URL discovery
//!
//! This module contains the core crawling logic, including:
//! - Concurrent HTTP fetching with a polled completion loop
//! - Latency-based liveness classification
//! - Overall round coordination

mod coordinator;
mod fetcher;
mod liveness;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, fetch_url, BodySink, FetchEngine, FetchResult, NetworkContext,
    UNFINISHED_ELAPSED,
};
pub use liveness::{classify_elapsed, Liveness, LivenessClassifier};

use crate::config::Config;
use crate::output::RunStats;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the record file
/// 2. Build the shared HTTP client
/// 3. Fetch, persist and extract for each configured round
/// 4. Run the final fetch and persist
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunStats)` - Crawl completed successfully
/// * `Err(CrawlError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<RunStats, CrawlError> {
    run_crawl(config).await
}
