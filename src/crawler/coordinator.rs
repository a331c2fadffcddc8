//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the round loop that coordinates the crawl:
//! - Handing the frontier to the fetch engine
//! - Classifying results and persisting live URLs
//! - Extracting, filtering and deduplicating the next frontier
//! - Pacing between rounds
//!
//! Rounds are strictly sequential: round N+1 starts only after round N's
//! extraction has finished, so ledgers, frontier and sink need no locking.

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::fetcher::{FetchEngine, FetchResult, NetworkContext};
use crate::crawler::liveness::{Liveness, LivenessClassifier};
use crate::output::{FileSink, Latency, Record, RecordSink, RunStats};
use crate::state::{CrawlPhase, DurableLedger, RoundLedger};
use crate::url::{extract, AcceptanceRule};
use crate::CrawlError;
use std::collections::HashSet;
use std::path::Path;

/// Main crawler coordinator structure
pub struct Coordinator<'ctx, S: RecordSink> {
    config: CrawlerConfig,
    rule: AcceptanceRule,
    engine: FetchEngine<'ctx>,
    classifier: LivenessClassifier,
    sink: S,
    ledger: DurableLedger,
    frontier: Vec<String>,
    phase: CrawlPhase,
    stats: RunStats,
}

impl<'ctx, S: RecordSink> Coordinator<'ctx, S> {
    /// Creates a new coordinator instance
    ///
    /// The first frontier is the configured seed list with duplicates
    /// removed, in order.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `context` - Network context shared by every fetch of the run
    /// * `sink` - Destination for records, already open
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError::NoSeeds)` - The seed list is empty
    pub fn new(config: &Config, context: &'ctx NetworkContext, sink: S) -> Result<Self, CrawlError> {
        let mut unique = HashSet::new();
        let frontier: Vec<String> = config
            .crawler
            .seeds
            .iter()
            .filter(|seed| unique.insert(seed.as_str()))
            .cloned()
            .collect();

        if frontier.is_empty() {
            return Err(CrawlError::NoSeeds);
        }

        Ok(Self {
            config: config.crawler.clone(),
            rule: AcceptanceRule::from_config(&config.acceptance),
            engine: FetchEngine::new(context, &config.fetch),
            classifier: LivenessClassifier::from_config(&config.crawler),
            sink,
            ledger: DurableLedger::new(),
            frontier,
            phase: CrawlPhase::Idle,
            stats: RunStats::start(),
        })
    }

    /// Runs the round loop to completion
    ///
    /// Each of the configured rounds fetches the frontier, persists live
    /// results and extracts the next frontier, then pauses. One final fetch
    /// and persist follows without extraction. The loop ends early if a
    /// round extracts nothing new.
    pub async fn run(&mut self) -> Result<RunStats, CrawlError> {
        tracing::info!(
            "Starting crawl: {} seeds, {} rounds",
            self.frontier.len(),
            self.config.max_rounds
        );

        for round in 1..=self.config.max_rounds {
            self.transition(CrawlPhase::Fetching(round))?;
            tracing::info!("Round {}: fetching {} URLs", round, self.frontier.len());
            let results = self.fetch_frontier(Some(round)).await;

            self.transition(CrawlPhase::Persisting(round))?;
            let verdicts = self.persist(&results, false)?;

            self.transition(CrawlPhase::Extracting(round))?;
            self.frontier = self.extract_frontier(round, &results, &verdicts);

            if let Some(stats) = self.stats.current_mut() {
                tracing::info!(
                    "Round {}: {} recorded, {} dead, {} queued for next round",
                    round,
                    stats.persisted,
                    stats.dead,
                    stats.queued
                );
            }

            if self.frontier.is_empty() {
                tracing::info!("Round {} found no new URLs, finishing early", round);
                return self.finish();
            }

            self.transition(CrawlPhase::Pacing(round))?;
            tokio::time::sleep(self.config.round_pause()).await;
        }

        self.transition(CrawlPhase::FinalFetch)?;
        tracing::info!("Final fetch of {} URLs", self.frontier.len());
        let results = self.fetch_frontier(None).await;

        self.transition(CrawlPhase::FinalPersist)?;
        self.persist(&results, true)?;

        self.finish()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// URLs waiting for the next fetch
    pub fn frontier(&self) -> &[String] {
        &self.frontier
    }

    pub fn ledger(&self) -> &DurableLedger {
        &self.ledger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    fn finish(&mut self) -> Result<RunStats, CrawlError> {
        self.sink.flush()?;
        self.transition(CrawlPhase::Done)?;
        self.stats.finish();

        tracing::info!(
            "Crawl completed: {} URLs recorded, {} dead",
            self.ledger.len(),
            self.ledger.dead_count()
        );

        Ok(self.stats.clone())
    }

    /// Hands the whole frontier to the fetch engine, leaving it empty
    async fn fetch_frontier(&mut self, round: Option<u32>) -> Vec<FetchResult> {
        let batch = std::mem::take(&mut self.frontier);
        self.stats.begin_round(round).fetched = batch.len();
        self.engine.fetch_all(&batch).await
    }

    /// Classifies results and writes live ones to the sink
    ///
    /// Returns one verdict per result, in result order.
    fn persist(
        &mut self,
        results: &[FetchResult],
        final_round: bool,
    ) -> Result<Vec<Liveness>, CrawlError> {
        let mut verdicts = Vec::with_capacity(results.len());
        let (mut persisted, mut dead, mut unfinished) = (0, 0, 0);

        for result in results {
            if result.is_unfinished() {
                unfinished += 1;
            }

            let liveness = self.classifier.classify(result);
            match liveness {
                Liveness::Dead => {
                    tracing::debug!(
                        "{} is dead ({:.6}s, status {:?})",
                        result.url,
                        result.elapsed_seconds,
                        result.status
                    );
                    self.ledger.mark_dead(&result.url);
                    dead += 1;
                }
                Liveness::Alive => {
                    if self.ledger.mark_persisted(&result.url) {
                        let latency = if final_round {
                            Latency::Unmeasured
                        } else {
                            Latency::Measured(result.elapsed_seconds)
                        };
                        self.sink.append(&Record::new(result.url.as_str(), latency))?;
                        persisted += 1;
                    }
                }
            }
            verdicts.push(liveness);
        }

        if let Some(stats) = self.stats.current_mut() {
            stats.persisted = persisted;
            stats.dead = dead;
            stats.unfinished = unfinished;
        }

        Ok(verdicts)
    }

    /// Builds the next frontier from this round's bodies
    ///
    /// Only bodies of an accepted content type are scanned, one valid UTF-8
    /// run at a time. A candidate joins the frontier if it is not in the
    /// durable ledger, was not already queued this round, and passes the
    /// acceptance rule.
    fn extract_frontier(
        &mut self,
        round: u32,
        results: &[FetchResult],
        verdicts: &[Liveness],
    ) -> Vec<String> {
        let patterns = self.rule.patterns_for_round(round);
        let mut round_ledger = RoundLedger::new(&self.ledger);
        let mut next = Vec::new();
        let mut candidates = 0;

        for (result, liveness) in results.iter().zip(verdicts) {
            if liveness.is_dead() && !self.config.scan_dead_bodies {
                continue;
            }

            if !result.has_content_type(self.rule.content_types()) {
                tracing::debug!(
                    "Not scanning {} (content type {:?})",
                    result.url,
                    result.content_type
                );
                continue;
            }

            for text in result.text_runs() {
                for raw in extract(text, patterns) {
                    candidates += 1;
                    let candidate = self.rule.resolve(raw);

                    if round_ledger.already_seen(&candidate) {
                        continue;
                    }
                    if !self.rule.accepts(&candidate) {
                        continue;
                    }

                    round_ledger.record(&candidate);
                    next.push(candidate.into_owned());
                }
            }
        }

        if let Some(stats) = self.stats.current_mut() {
            stats.candidates = candidates;
            stats.queued = round_ledger.len();
        }

        next
    }
}

/// Runs the main crawl operation
///
/// 1. Validate the configuration
/// 2. Open the record file (the only fatal failure point once running)
/// 3. Build the network context
/// 4. Run the round loop
/// 5. Release the network context
///
/// # Example
///
/// ```no_run
/// use breadth_crawler::config::load_config;
/// use breadth_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} URLs recorded", stats.total_persisted());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunStats, CrawlError> {
    if config.crawler.seeds.is_empty() {
        return Err(CrawlError::NoSeeds);
    }
    validate(&config)?;

    let sink = FileSink::create(Path::new(&config.output.records_path))?;
    let context = NetworkContext::new(&config.fetch, &config.user_agent)?;

    let mut coordinator = Coordinator::new(&config, &context, sink)?;
    coordinator.run().await
}
