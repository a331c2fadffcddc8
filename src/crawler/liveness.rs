//! Latency-based liveness heuristic
//!
//! A request to a non-existent or refusing endpoint fails orders of magnitude
//! faster than a genuine HTTP exchange. Fetches completing under the
//! threshold are treated as dead and are neither recorded nor fetched again.
//!
//! The timing check alone misses refused connections on a fast local stack,
//! so by default a fetch that never received a response head is dead as well.

use crate::config::CrawlerConfig;
use crate::crawler::FetchResult;

/// Liveness verdict for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Liveness {
    Alive,
    Dead,
}

impl Liveness {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Classifies an elapsed time against a threshold (both in seconds)
///
/// Exactly the threshold counts as alive. Unfinished fetches (negative
/// elapsed time) and NaN are dead.
///
/// # Examples
///
/// ```
/// use breadth_crawler::crawler::{classify_elapsed, Liveness};
///
/// assert_eq!(classify_elapsed(5e-5, 1e-4), Liveness::Dead);
/// assert_eq!(classify_elapsed(0.2, 1e-4), Liveness::Alive);
/// ```
pub fn classify_elapsed(elapsed_seconds: f64, threshold: f64) -> Liveness {
    if elapsed_seconds >= threshold {
        Liveness::Alive
    } else {
        Liveness::Dead
    }
}

/// Liveness classifier configured for a run
#[derive(Debug, Clone, Copy)]
pub struct LivenessClassifier {
    threshold: f64,
    require_status: bool,
}

impl LivenessClassifier {
    pub fn new(threshold: f64, require_status: bool) -> Self {
        Self {
            threshold,
            require_status,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.min_response_time, config.require_http_status)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classifies a completed fetch
    ///
    /// With `require_status` set (the default), a fetch that never produced
    /// an HTTP status is dead; the timing check applies either way.
    pub fn classify(&self, result: &FetchResult) -> Liveness {
        if self.require_status && result.status.is_none() {
            return Liveness::Dead;
        }
        classify_elapsed(result.elapsed_seconds, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DEFAULT_MIN_RESPONSE_TIME;

    fn result(elapsed_seconds: f64, status: Option<u16>) -> FetchResult {
        FetchResult {
            url: "https://www.example.com/".to_string(),
            body: Vec::new(),
            elapsed_seconds,
            status,
            error: None,
            content_type: None,
        }
    }

    #[test]
    fn test_fast_failure_is_dead() {
        assert_eq!(
            classify_elapsed(5e-5, DEFAULT_MIN_RESPONSE_TIME),
            Liveness::Dead
        );
    }

    #[test]
    fn test_real_response_is_alive() {
        assert_eq!(
            classify_elapsed(0.05, DEFAULT_MIN_RESPONSE_TIME),
            Liveness::Alive
        );
    }

    #[test]
    fn test_boundary_is_deterministic() {
        let threshold = DEFAULT_MIN_RESPONSE_TIME;
        let first = classify_elapsed(threshold, threshold);
        for _ in 0..100 {
            assert_eq!(classify_elapsed(threshold, threshold), first);
        }
        assert_eq!(first, Liveness::Alive);
    }

    #[test]
    fn test_unfinished_and_nan_are_dead() {
        assert!(classify_elapsed(-1.0, DEFAULT_MIN_RESPONSE_TIME).is_dead());
        assert!(classify_elapsed(f64::NAN, DEFAULT_MIN_RESPONSE_TIME).is_dead());
    }

    #[test]
    fn test_classifier_timing_only() {
        let classifier = LivenessClassifier::new(DEFAULT_MIN_RESPONSE_TIME, false);
        // Transport failure with no status falls back to timing
        assert!(classifier.classify(&result(0.5, None)).is_alive());
        assert!(classifier.classify(&result(5e-5, Some(200))).is_dead());
    }

    #[test]
    fn test_classifier_requires_status() {
        let classifier = LivenessClassifier::new(DEFAULT_MIN_RESPONSE_TIME, true);
        assert!(classifier.classify(&result(0.5, None)).is_dead());
        assert!(classifier.classify(&result(0.5, Some(404))).is_alive());
        assert!(classifier.classify(&result(5e-5, Some(200))).is_dead());
    }

    #[test]
    fn test_from_config() {
        let config = CrawlerConfig::default();
        let classifier = LivenessClassifier::from_config(&config);
        assert_eq!(classifier.threshold(), DEFAULT_MIN_RESPONSE_TIME);
    }

    #[test]
    fn test_default_config_rejects_refused_connection() {
        let classifier = LivenessClassifier::from_config(&CrawlerConfig::default());

        // Loopback refusals finish just above the timing threshold
        let refused = FetchResult {
            error: Some("Connection failed: Connection refused".to_string()),
            ..result(1.4e-4, None)
        };
        assert!(classifier.classify(&refused).is_dead());
        assert!(classifier.classify(&result(1.4e-4, Some(200))).is_alive());
    }

    #[test]
    fn test_timing_only_when_status_not_required() {
        let config = CrawlerConfig {
            require_http_status: false,
            ..CrawlerConfig::default()
        };
        let classifier = LivenessClassifier::from_config(&config);
        let refused = FetchResult {
            error: Some("Connection failed: Connection refused".to_string()),
            ..result(1.4e-4, None)
        };
        assert!(classifier.classify(&refused).is_alive());
    }
}
