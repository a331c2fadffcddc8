//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Position of the orchestrator in the round loop
//! - `DurableLedger`: URLs finished with for the whole run (persisted or dead)
//! - `RoundLedger`: Duplicate guard for a single extraction pass

mod ledger;
mod phase;

// Re-export main types
pub use ledger::{DurableLedger, RoundLedger};
pub use phase::CrawlPhase;
