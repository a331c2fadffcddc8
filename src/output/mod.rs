//! Output module for crawl results
//!
//! This module handles:
//! - Writing accepted URLs to the append-only record file
//! - Recording and printing crawl statistics

mod sink;
pub mod stats;

pub use sink::{FileSink, Latency, Record, RecordSink};
pub use stats::{print_statistics, RoundStats, RunStats};
