use std::collections::HashSet;

/// Cross-round record of URLs the run is finished with
///
/// `accepted` holds every URL written to the record sink. `dead` holds URLs
/// whose fetch was classified dead; they are never written but are not
/// fetched again in the same run either. Neither set shrinks.
#[derive(Debug, Clone, Default)]
pub struct DurableLedger {
    accepted: HashSet<String>,
    dead: HashSet<String>,
}

impl DurableLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL that was just persisted
    ///
    /// Returns false if it was already recorded.
    pub fn mark_persisted(&mut self, url: &str) -> bool {
        if self.accepted.contains(url) {
            return false;
        }
        self.accepted.insert(url.to_string())
    }

    /// Records a URL whose fetch was classified dead
    pub fn mark_dead(&mut self, url: &str) {
        if !self.dead.contains(url) {
            self.dead.insert(url.to_string());
        }
    }

    /// True if the URL was persisted or found dead earlier in the run
    pub fn already_seen(&self, url: &str) -> bool {
        self.accepted.contains(url) || self.dead.contains(url)
    }

    pub fn is_persisted(&self, url: &str) -> bool {
        self.accepted.contains(url)
    }

    /// Number of persisted URLs
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }
}

/// Per-round duplicate guard layered over the durable ledger
///
/// Lives for one extraction pass; dropping it discards the batch set.
#[derive(Debug)]
pub struct RoundLedger<'a> {
    durable: &'a DurableLedger,
    batch: HashSet<String>,
}

impl<'a> RoundLedger<'a> {
    pub fn new(durable: &'a DurableLedger) -> Self {
        Self {
            durable,
            batch: HashSet::new(),
        }
    }

    /// True if the URL is durable, dead, or already queued this round
    pub fn already_seen(&self, url: &str) -> bool {
        self.durable.already_seen(url) || self.batch.contains(url)
    }

    /// Queues a URL for this round; returns false if it was already queued
    pub fn record(&mut self, url: &str) -> bool {
        if self.batch.contains(url) {
            return false;
        }
        self.batch.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }
}
