/// Phase definitions for the crawl round loop
///
/// The orchestrator moves through these phases strictly in order; any other
/// move is a programming error and is reported as `CrawlError::InvalidTransition`.
use std::fmt;

/// Current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing fetched yet
    Idle,

    // ===== Round phases (1-based round number) =====
    /// Frontier handed to the fetch engine
    Fetching(u32),

    /// Live results being written to the record sink
    Persisting(u32),

    /// Fetched bodies being scanned for the next frontier
    Extracting(u32),

    /// Fixed delay before the next round
    Pacing(u32),

    // ===== Closing phases =====
    /// Fetch of the last extracted frontier
    FinalFetch,

    /// Persist of the final fetch, without further extraction
    FinalPersist,

    /// Sink closed, run over
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (*self, next) {
            (Idle, Fetching(1)) => true,
            // Zero configured rounds: only the final fetch runs
            (Idle, FinalFetch) => true,
            (Fetching(r), Persisting(s)) => r == s,
            (Persisting(r), Extracting(s)) => r == s,
            (Extracting(r), Pacing(s)) => r == s,
            // Extraction produced nothing to fetch
            (Extracting(_), Done) => true,
            (Pacing(r), Fetching(s)) => s == r + 1,
            (Pacing(_), FinalFetch) => true,
            (FinalFetch, FinalPersist) => true,
            (FinalPersist, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching(r) => write!(f, "fetching({})", r),
            Self::Persisting(r) => write!(f, "persisting({})", r),
            Self::Extracting(r) => write!(f, "extracting({})", r),
            Self::Pacing(r) => write!(f, "pacing({})", r),
            Self::FinalFetch => write!(f, "final_fetch"),
            Self::FinalPersist => write!(f, "final_persist"),
            Self::Done => write!(f, "done"),
        }
    }
}
