//! Concurrent fetch engine
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client inside an explicitly owned network context
//! - Issuing every request of a frontier at once on the current runtime
//! - Waiting on completions with a bounded poll interval
//! - Streaming bodies into per-request sinks and timing each transfer
//!
//! There are no retries. A failed request yields its elapsed time and
//! whatever part of the body arrived before the failure.

use crate::config::{FetchConfig, UserAgentConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client, Response};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Elapsed time reported for fetches that never completed
pub const UNFINISHED_ELAPSED: f64 = -1.0;

/// Outcome of fetching one frontier entry
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL as it appeared in the frontier
    pub url: String,

    /// Response body; empty or partial on failure
    pub body: Vec<u8>,

    /// Seconds from request start to end of transfer, or -1 if unfinished
    pub elapsed_seconds: f64,

    /// HTTP status code, if a response head arrived
    pub status: Option<u16>,

    /// Transport error description
    pub error: Option<String>,

    /// `Content-Type` header of the response, if any
    pub content_type: Option<String>,
}

impl FetchResult {
    /// Placeholder for a fetch the engine gave up waiting on
    pub fn unfinished(url: &str) -> Self {
        Self {
            url: url.to_string(),
            body: Vec::new(),
            elapsed_seconds: UNFINISHED_ELAPSED,
            status: None,
            error: Some("fetch did not complete".to_string()),
            content_type: None,
        }
    }

    pub fn is_unfinished(&self) -> bool {
        self.elapsed_seconds < 0.0
    }

    /// Maximal valid UTF-8 runs of the body, in order
    ///
    /// Invalid byte sequences separate runs instead of being replaced, so no
    /// text is made up that the server never sent.
    pub fn text_runs(&self) -> Vec<&str> {
        let mut runs = Vec::new();
        let mut rest = self.body.as_slice();

        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    runs.push(text);
                    break;
                }
                Err(e) => {
                    let (valid, invalid) = rest.split_at(e.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        if !text.is_empty() {
                            runs.push(text);
                        }
                    }
                    // A truncated sequence at the very end has no error length
                    let skip = e.error_len().unwrap_or(invalid.len());
                    rest = &invalid[skip..];
                }
            }
        }

        runs
    }

    /// True if the `Content-Type` header contains any of `accepted`
    /// (ASCII case-insensitive); an empty list accepts everything
    pub fn has_content_type(&self, accepted: &[String]) -> bool {
        if accepted.is_empty() {
            return true;
        }
        let Some(content_type) = &self.content_type else {
            return false;
        };
        let content_type = content_type.to_ascii_lowercase();
        accepted
            .iter()
            .any(|wanted| content_type.contains(&wanted.to_ascii_lowercase()))
    }
}

/// Destination for received body bytes, bound to a single request
pub trait BodySink {
    fn append(&mut self, chunk: &[u8]);
}

impl BodySink for Vec<u8> {
    fn append(&mut self, chunk: &[u8]) {
        self.extend_from_slice(chunk);
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `fetch` - Timeouts for every request
/// * `user_agent` - The user agent identification
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    fetch: &FetchConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(fetch.request_timeout())
        .connect_timeout(fetch.connect_timeout())
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Process-wide networking state
///
/// Built once before the first fetch and borrowed by every [`FetchEngine`];
/// connection pools and TLS state are released when it is dropped.
#[derive(Debug)]
pub struct NetworkContext {
    client: Client,
}

impl NetworkContext {
    pub fn new(fetch: &FetchConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(fetch, user_agent)?;
        tracing::debug!("Network context ready ({})", user_agent.header_value());
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for NetworkContext {
    fn drop(&mut self) {
        tracing::debug!("Network context released");
    }
}

/// Issues a batch of requests concurrently and collects their results
///
/// All requests are spawned on the current runtime and driven by its
/// readiness reactor; the engine itself only waits for completions, each
/// wait capped by the poll interval.
pub struct FetchEngine<'ctx> {
    context: &'ctx NetworkContext,
    poll_interval: Duration,
    permits: Arc<Semaphore>,
}

impl<'ctx> FetchEngine<'ctx> {
    pub fn new(context: &'ctx NetworkContext, config: &FetchConfig) -> Self {
        Self {
            context,
            poll_interval: config.poll_interval(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches as usize)),
        }
    }

    /// Fetches every URL and returns results in input order
    ///
    /// If a task can no longer be joined the wait loop stops early: results
    /// already collected are kept, the rest are reported unfinished.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<FetchResult> {
        self.fetch_all_with(urls, |client, url| async move {
            fetch_url(&client, &url).await
        })
        .await
    }

    /// Same as [`fetch_all`](Self::fetch_all) with a custom per-URL fetch
    ///
    /// `fetch` is called once per URL with a handle to the shared client. The
    /// future it returns is first polled after an in-flight permit is held.
    pub async fn fetch_all_with<F, Fut>(&self, urls: &[String], fetch: F) -> Vec<FetchResult>
    where
        F: Fn(Client, String) -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let mut results: Vec<FetchResult> =
            urls.iter().map(|url| FetchResult::unfinished(url)).collect();

        if urls.is_empty() {
            return results;
        }

        let mut in_flight = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            tracing::debug!("Obtaining data from {}", url);
            let permits = Arc::clone(&self.permits);
            let request = fetch(self.context.client().clone(), url.clone());

            in_flight.spawn(async move {
                // The semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                (index, request.await)
            });
        }

        let mut completed = 0;
        loop {
            match tokio::time::timeout(self.poll_interval, in_flight.join_next()).await {
                Ok(Some(Ok((index, result)))) => {
                    results[index] = result;
                    completed += 1;
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(
                        "Fetch task failed ({}), abandoning {} in-flight requests",
                        e,
                        in_flight.len()
                    );
                    break;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::trace!(
                        "Poll interval elapsed: {}/{} complete, {} in flight",
                        completed,
                        urls.len(),
                        in_flight.len()
                    );
                }
            }
        }

        in_flight.abort_all();
        results
    }
}

/// Fetches one URL, timing the full transfer
///
/// URLs without a scheme (as extracted from `www.` markers) are requested
/// over plain HTTP; the result keeps the URL as given.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let started = Instant::now();
    let mut body: Vec<u8> = Vec::new();

    let (status, error, content_type) =
        match client.get(request_target(url).as_ref()).send().await {
            Ok(mut response) => {
                let status = response.status().as_u16();
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let error = drain_body(&mut response, &mut body)
                    .await
                    .err()
                    .map(|e| describe_error(&e));
                (Some(status), error, content_type)
            }
            Err(e) => (None, Some(describe_error(&e)), None),
        };

    let elapsed_seconds = started.elapsed().as_secs_f64();

    if let Some(error) = &error {
        tracing::debug!("Fetch of {} failed after {:.6}s: {}", url, elapsed_seconds, error);
    }

    FetchResult {
        url: url.to_string(),
        body,
        elapsed_seconds,
        status,
        error,
        content_type,
    }
}

/// Streams a response body into a sink chunk by chunk
async fn drain_body<S: BodySink>(response: &mut Response, sink: &mut S) -> Result<(), reqwest::Error> {
    while let Some(chunk) = response.chunk().await? {
        sink.append(&chunk);
    }
    Ok(())
}

fn request_target(url: &str) -> Cow<'_, str> {
    if url.contains("://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("http://{}", url))
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else if e.is_builder() {
        format!("Invalid request: {}", e)
    } else {
        e.to_string()
    }
}
