//! Run statistics
//!
//! Counters collected by the orchestrator while the crawl runs, plus a
//! formatted report printed once the run is over.

use chrono::{DateTime, Utc};

/// Counters for a single round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Round number; `None` for the final fetch
    pub round: Option<u32>,

    /// URLs handed to the fetch engine
    pub fetched: usize,

    /// Fetches classified alive and written to the sink
    pub persisted: usize,

    /// Fetches classified dead
    pub dead: usize,

    /// Fetches still in flight when the engine gave up on them
    pub unfinished: usize,

    /// Raw candidates extracted from this round's bodies
    pub candidates: usize,

    /// Candidates queued for the next round
    pub queued: usize,
}

impl RoundStats {
    pub fn new(round: Option<u32>) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }
}

/// Statistics for a whole run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub rounds: Vec<RoundStats>,
}

impl RunStats {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            rounds: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Opens the counters for a new round and returns them
    pub fn begin_round(&mut self, round: Option<u32>) -> &mut RoundStats {
        self.rounds.push(RoundStats::new(round));
        let last = self.rounds.len() - 1;
        &mut self.rounds[last]
    }

    /// Counters of the round currently running
    pub fn current_mut(&mut self) -> Option<&mut RoundStats> {
        self.rounds.last_mut()
    }

    pub fn total_fetched(&self) -> usize {
        self.rounds.iter().map(|r| r.fetched).sum()
    }

    pub fn total_persisted(&self) -> usize {
        self.rounds.iter().map(|r| r.persisted).sum()
    }

    pub fn total_dead(&self) -> usize {
        self.rounds.iter().map(|r| r.dead).sum()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    println!("Rounds:");
    for round in &stats.rounds {
        let label = match round.round {
            Some(n) => format!("round {}", n),
            None => "final".to_string(),
        };
        println!(
            "  {:<9} fetched {:>5}  persisted {:>5}  dead {:>5}  unfinished {:>4}  candidates {:>6}  queued {:>5}",
            label,
            round.fetched,
            round.persisted,
            round.dead,
            round.unfinished,
            round.candidates,
            round.queued
        );
    }
    println!();

    let fetched = stats.total_fetched();
    let persisted = stats.total_persisted();
    let live_rate = if fetched > 0 {
        (persisted as f64 / fetched as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Live Rate: {:.1}% ({} / {} fetched URLs recorded, {} dead)",
        live_rate,
        persisted,
        fetched,
        stats.total_dead()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut stats = RunStats::start();
        {
            let round = stats.begin_round(Some(1));
            round.fetched = 3;
            round.persisted = 2;
            round.dead = 1;
        }
        {
            let round = stats.begin_round(None);
            round.fetched = 5;
            round.persisted = 5;
        }

        assert_eq!(stats.total_fetched(), 8);
        assert_eq!(stats.total_persisted(), 7);
        assert_eq!(stats.total_dead(), 1);
        assert_eq!(stats.rounds[1].round, None);
    }

    #[test]
    fn test_current_round() {
        let mut stats = RunStats::start();
        assert!(stats.current_mut().is_none());

        stats.begin_round(Some(1));
        stats.current_mut().unwrap().candidates = 4;
        assert_eq!(stats.rounds[0].candidates, 4);
    }

    #[test]
    fn test_duration_after_finish() {
        let mut stats = RunStats::start();
        assert!(stats.duration_seconds().is_none());
        stats.finish();
        assert!(stats.duration_seconds().unwrap() >= 0);
    }
}
