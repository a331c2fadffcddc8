//! Breadth-Crawler main entry point
//!
//! This is the command-line interface for the breadth-first URL crawler.

use anyhow::Context;
use breadth_crawler::config::{load_config_with_hash, validate, AcceptanceConfig, Config};
use breadth_crawler::crawler::crawl;
use breadth_crawler::output::print_statistics;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Breadth-Crawler: a bounded breadth-first URL discovery crawler
///
/// Starting from a set of seed URLs, fetches every frontier URL concurrently,
/// records the live ones with their response time, and extracts the next
/// frontier from the response bodies, for a fixed number of rounds.
#[derive(Parser, Debug)]
#[command(name = "breadth-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A bounded breadth-first URL discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL, may be repeated; added after the configured seeds
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Record file path, overrides `[output] records-path`
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Number of fetch/extract rounds, overrides `[crawler] max-rounds`
    #[arg(long, value_name = "N")]
    rounds: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("breadth_crawler=info,warn"),
            1 => EnvFilter::new("breadth_crawler=debug,info"),
            2 => EnvFilter::new("breadth_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, applies command-line overrides and
/// re-validates the result
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    config.crawler.seeds.extend(cli.seeds.iter().cloned());
    if let Some(output) = &cli.output {
        config.output.records_path = output.clone();
    }
    if let Some(rounds) = cli.rounds {
        config.crawler.max_rounds = rounds;
    }

    validate(&config).context("Invalid command-line overrides")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Breadth-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Rounds: {} (+1 final fetch)", config.crawler.max_rounds);
    println!("  Round pause: {}ms", config.crawler.round_pause_ms);
    println!(
        "  Minimum response time: {}s",
        config.crawler.min_response_time
    );
    println!(
        "  Require HTTP status: {}",
        config.crawler.require_http_status
    );
    println!("  Scan dead bodies: {}", config.crawler.scan_dead_bodies);

    println!("\nFetch:");
    println!("  Poll interval: {}ms", config.fetch.poll_interval_ms);
    println!(
        "  Timeouts: connect {}s, request {}s",
        config.fetch.connect_timeout_secs, config.fetch.request_timeout_secs
    );
    println!(
        "  Max concurrent fetches: {}",
        config.fetch.max_concurrent_fetches
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    println!("\nAcceptance:");
    match &config.acceptance {
        AcceptanceConfig::Generic(rules) => {
            println!("  Mode: generic");
            println!("  Markers: {}", rules.markers.join(" "));
            println!("  Whitelist: {}", rules.whitelist.join(" "));
            println!("  Blacklist: {}", rules.blacklist.join(" "));
            print_content_types(&rules.content_types);
        }
        AcceptanceConfig::Structured(rules) => {
            println!("  Mode: structured");
            println!("  Base: {}", rules.base);
            print_content_types(&rules.content_types);
            for (index, marker) in rules.rounds.iter().enumerate() {
                println!(
                    "  Round {}: {:?} .. {:?}",
                    index + 1,
                    marker.start,
                    marker.end
                );
            }
        }
    }

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  * {}", seed);
    }

    if config.crawler.seeds.is_empty() {
        println!("\n✗ No seed URLs; a crawl would not start");
    } else {
        println!("\n✓ Configuration is valid");
    }
}

fn print_content_types(content_types: &[String]) {
    if content_types.is_empty() {
        println!("  Scanned content types: all");
    } else {
        println!("  Scanned content types: {}", content_types.join(" "));
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Seeds: {}, rounds: {}, records: {}",
        config.crawler.seeds.len(),
        config.crawler.max_rounds,
        config.output.records_path
    );

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
