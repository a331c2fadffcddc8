//! URL handling module
//!
//! This module provides marker-based candidate extraction and the acceptance
//! rules that decide which candidates join the next frontier.

mod extract;
mod filter;

use crate::config::AcceptanceConfig;
use std::borrow::Cow;

// Re-export main functions
pub use extract::{extract, Extraction, Pattern};
pub use filter::{GenericFilter, Verdict};

/// Acceptance rule chosen for the run
#[derive(Debug, Clone)]
pub enum AcceptanceRule {
    /// Scheme/prefix markers, candidates checked against blacklist and whitelist
    Generic {
        patterns: Vec<Pattern>,
        filter: GenericFilter,
        content_types: Vec<String>,
    },

    /// One fixed marker per round; matches are relative paths under `base`
    Structured {
        base: String,
        rounds: Vec<Pattern>,
        content_types: Vec<String>,
    },
}

impl AcceptanceRule {
    /// Builds the rule from its configuration
    pub fn from_config(config: &AcceptanceConfig) -> Self {
        match config {
            AcceptanceConfig::Generic(rules) => Self::Generic {
                patterns: rules
                    .markers
                    .iter()
                    .map(|marker| Pattern::new(marker.as_str(), rules.delimiters.as_str()))
                    .collect(),
                filter: GenericFilter::new(rules.blacklist.clone(), rules.whitelist.clone()),
                content_types: rules.content_types.clone(),
            },
            AcceptanceConfig::Structured(rules) => Self::Structured {
                base: rules.base.trim_end_matches('/').to_string(),
                rounds: rules
                    .rounds
                    .iter()
                    .map(|rule| Pattern::new(rule.start.as_str(), rule.end.as_str()))
                    .collect(),
                content_types: rules.content_types.clone(),
            },
        }
    }

    /// Patterns to scan for in the given round (1-based)
    ///
    /// In structured mode round N uses the N-th marker; rounds past the end
    /// of the list keep using the last one.
    pub fn patterns_for_round(&self, round: u32) -> &[Pattern] {
        match self {
            Self::Generic { patterns, .. } => patterns,
            Self::Structured { rounds, .. } => {
                if rounds.is_empty() {
                    return &[];
                }
                let index = (round.max(1) as usize - 1).min(rounds.len() - 1);
                &rounds[index..=index]
            }
        }
    }

    /// Content types whose bodies are scanned; empty means all
    pub fn content_types(&self) -> &[String] {
        match self {
            Self::Generic { content_types, .. } | Self::Structured { content_types, .. } => {
                content_types
            }
        }
    }

    /// Turns a raw extracted match into a candidate URL
    ///
    /// Structured sources embedded in JSON escape slashes as `\/`; they are
    /// unescaped before the path is appended to the base.
    pub fn resolve<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        match self {
            Self::Generic { .. } => Cow::Borrowed(raw),
            Self::Structured { base, .. } => {
                Cow::Owned(format!("{}{}", base, raw.replace("\\/", "/")))
            }
        }
    }

    /// Decides whether a candidate may join the frontier
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            Self::Generic { filter, .. } => match filter.evaluate(candidate) {
                Verdict::Accept => {
                    tracing::debug!("{} accepted", candidate);
                    true
                }
                verdict => {
                    tracing::debug!("{} rejected ({:?})", candidate, verdict);
                    false
                }
            },
            // The pattern match itself is the filter
            Self::Structured { .. } => true,
        }
    }
}
