//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full round loop end-to-end, from seed fetch to record file.

use breadth_crawler::config::{AcceptanceConfig, Config, GenericRules, MarkerRule, StructuredRules};
use breadth_crawler::crawler::{run_crawl, Coordinator, NetworkContext};
use breadth_crawler::output::Record;
use breadth_crawler::{CrawlError, CrawlPhase};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock responses are delayed so every fetch clears the liveness threshold
const RESPONSE_DELAY: Duration = Duration::from_millis(20);

/// Creates a test configuration accepting only links back to the mock server
fn create_test_config(seeds: Vec<String>, records_path: &Path, max_rounds: u32) -> Config {
    let mut config = Config::default();
    config.crawler.seeds = seeds;
    config.crawler.max_rounds = max_rounds;
    config.crawler.round_pause_ms = 0;
    config.fetch.poll_interval_ms = 50;
    config.fetch.connect_timeout_secs = 2;
    config.fetch.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.records_path = records_path.display().to_string();
    config.acceptance = AcceptanceConfig::Generic(GenericRules {
        whitelist: vec!["127.0.0.1".to_string()],
        ..GenericRules::default()
    });
    config
}

fn html_page(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
        .set_delay(RESPONSE_DELAY)
}

fn read_records(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read record file")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Address that refuses connections
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let address = listener.local_addr().expect("No local addr");
    drop(listener);
    format!("http://{}/", address)
}

/// Splits `<url>, <value> ms` into its url and value
fn split_record(line: &str) -> (&str, &str) {
    let (url, rest) = line.rsplit_once(", ").expect("Malformed record");
    let value = rest.strip_suffix(" ms").expect("Missing ms suffix");
    (url, value)
}

#[tokio::test]
async fn test_full_crawl_generic_mode() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(format!(
            r#"<html><body>
            <a href="{0}/page1">Page 1</a>
            <a href="{0}/page1">Page 1 again</a>
            <a href="{0}/report.pdf">Report</a>
            <link rel="stylesheet" href="{0}/style.css">
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_page("<html><body>Leaf</body></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let config = create_test_config(vec![format!("{}/", base_url)], &records_path, 1);

    let stats = run_crawl(config).await.expect("Crawl failed");

    let records = read_records(&records_path);
    assert_eq!(records.len(), 2, "records: {:?}", records);

    let (seed_url, seed_value) = split_record(&records[0]);
    assert_eq!(seed_url, format!("{}/", base_url));
    let decimals = seed_value.split_once('.').map(|(_, frac)| frac.len());
    assert_eq!(decimals, Some(3));
    let seed_value: f64 = seed_value.parse().expect("Measured value is a number");
    assert!(seed_value >= 2.0, "20ms delay gives at least 2.000");

    // Final round writes a literal zero
    assert_eq!(records[1], format!("{}/page1, 0 ms", base_url));

    assert_eq!(stats.rounds.len(), 2);
    assert_eq!(stats.rounds[0].round, Some(1));
    assert_eq!(stats.rounds[0].queued, 1);
    assert_eq!(stats.rounds[1].round, None);
    assert_eq!(stats.total_persisted(), 2);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_multi_round_records_each_url_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(format!(
            r#"<a href="{0}/a">a</a> <a href="{0}/b">b</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(format!(
            r#"<a href="{0}/">home</a> <a href="{0}/b">b</a> <a href="{0}/c">c</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(format!(
            r#"<a href="{0}/a">a</a> <a href="{0}/c">c</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page(format!(r#"<a href="{0}/">home</a>"#, base_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let config = create_test_config(vec![format!("{}/", base_url)], &records_path, 3);

    let stats = run_crawl(config).await.expect("Crawl failed");

    let records = read_records(&records_path);
    let urls: Vec<&str> = records.iter().map(|line| split_record(line).0).collect();
    let unique: HashSet<&str> = urls.iter().copied().collect();

    assert_eq!(urls.len(), 4, "records: {:?}", records);
    assert_eq!(unique.len(), urls.len(), "duplicate record lines");
    assert!(unique.contains(format!("{}/c", base_url).as_str()));

    // Round 3 finds nothing new, so the run ends without a final fetch
    assert_eq!(stats.rounds.len(), 3);
    assert!(stats.rounds.iter().all(|round| round.round.is_some()));
    assert_eq!(stats.rounds[2].queued, 0);
}

#[tokio::test]
async fn test_structured_mode_resolves_against_base() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(html_page(
            r#"{"items":["/watch?v=abc","/watch?v=def","/watch?v=abc"]}"#.to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(html_page("video".to_string()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let mut config = create_test_config(vec![format!("{}/feed", base_url)], &records_path, 1);
    config.acceptance = AcceptanceConfig::Structured(StructuredRules {
        base: base_url.clone(),
        rounds: vec![MarkerRule {
            start: "/watch?v=".to_string(),
            end: "\"".to_string(),
        }],
        content_types: Vec::new(),
    });

    run_crawl(config).await.expect("Crawl failed");

    let records = read_records(&records_path);
    assert_eq!(records.len(), 3, "records: {:?}", records);
    assert!(records[0].starts_with(&format!("{}/feed, ", base_url)));
    assert_eq!(records[1], format!("{}/watch?v=abc, 0 ms", base_url));
    assert_eq!(records[2], format!("{}/watch?v=def, 0 ms", base_url));
}

#[tokio::test]
async fn test_structured_escaped_marker_in_second_round() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(html_page(r#"{"items":["/watch?v=abc"]}"#.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(html_page(
            r#"{"owner":"\/channel\/UC123","next":"/watch?v=zzz"}"#.to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channel/UC123"))
        .respond_with(html_page("channel".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let mut config = create_test_config(vec![format!("{}/feed", base_url)], &records_path, 2);
    config.acceptance = AcceptanceConfig::Structured(StructuredRules {
        base: base_url.clone(),
        rounds: vec![
            MarkerRule {
                start: "/watch?v=".to_string(),
                end: "\"".to_string(),
            },
            MarkerRule {
                start: r"\/channel\/".to_string(),
                end: "\"".to_string(),
            },
        ],
        content_types: Vec::new(),
    });

    run_crawl(config).await.expect("Crawl failed");

    let records = read_records(&records_path);
    assert_eq!(records.len(), 3, "records: {:?}", records);
    assert_eq!(split_record(&records[1]).0, format!("{}/watch?v=abc", base_url));
    assert_eq!(records[2], format!("{}/channel/UC123, 0 ms", base_url));
}

#[tokio::test]
async fn test_non_html_pages_are_recorded_but_not_scanned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("plain text link {}/hidden", base_url))
                .insert_header("content-type", "text/plain")
                .set_delay(RESPONSE_DELAY),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page("never fetched".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let config = create_test_config(vec![format!("{}/", base_url)], &records_path, 2);

    let stats = run_crawl(config).await.expect("Crawl failed");

    let records = read_records(&records_path);
    assert_eq!(records.len(), 1, "records: {:?}", records);
    assert!(records[0].starts_with(&format!("{}/, ", base_url)));
    assert_eq!(stats.rounds[0].candidates, 0);
}

#[tokio::test]
async fn test_sink_unavailable_is_fatal_before_fetching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        vec![format!("{}/", mock_server.uri())],
        Path::new("/nonexistent/dir/urls.txt"),
        1,
    );

    let result = run_crawl(config).await;
    assert!(matches!(result, Err(CrawlError::SinkUnavailable { .. })));
}

#[tokio::test]
async fn test_empty_seed_list_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let config = create_test_config(Vec::new(), &records_path, 1);

    let result = run_crawl(config).await;
    assert!(matches!(result, Err(CrawlError::NoSeeds)));
}

#[tokio::test]
async fn test_fast_responses_are_excluded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(format!(r#"<a href="{}/next">next</a>"#, base_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let mut config = create_test_config(vec![format!("{}/", base_url)], &records_path, 2);
    // No real fetch can take this long, so everything is classified dead
    config.crawler.min_response_time = 1_000.0;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert!(read_records(&records_path).is_empty());
    assert_eq!(stats.total_dead(), 1);
    assert_eq!(stats.rounds.len(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_not_recorded() {
    let closed = closed_port_url();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("alive".to_string()))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let live = format!("{}/", mock_server.uri());
    let config = create_test_config(vec![closed.clone(), live.clone()], &records_path, 1);

    let context =
        NetworkContext::new(&config.fetch, &config.user_agent).expect("Failed to build client");
    let mut coordinator =
        Coordinator::new(&config, &context, Vec::<Record>::new()).expect("Coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(coordinator.sink().len(), 1);
    assert_eq!(coordinator.sink()[0].url, live);
    assert!(coordinator.ledger().already_seen(&closed));
    assert!(!coordinator.ledger().is_persisted(&closed));
    assert_eq!(stats.total_dead(), 1);
}

#[tokio::test]
async fn test_refused_final_fetch_leaves_record_file_empty() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records_path = temp_dir.path().join("urls.txt");
    let config = create_test_config(vec![closed_port_url()], &records_path, 0);

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert!(read_records(&records_path).is_empty());
    assert_eq!(stats.rounds.len(), 1);
    assert_eq!(stats.rounds[0].round, None);
    assert_eq!(stats.total_dead(), 1);
}
