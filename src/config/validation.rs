use crate::config::types::{
    AcceptanceConfig, Config, CrawlerConfig, FetchConfig, GenericRules, MarkerRule, OutputConfig,
    StructuredRules, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Longest allowed single wait of the fetch loop
const MAX_POLL_INTERVAL_MS: u64 = 1_000;

/// Frontier size grows exponentially with rounds
const MAX_ROUNDS: u32 = 16;

const MAX_CONCURRENT_FETCHES: u32 = 4_096;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_acceptance_config(&config.acceptance)?;
    Ok(())
}

/// Validates round loop configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    if config.max_rounds > MAX_ROUNDS {
        return Err(ConfigError::Validation(format!(
            "max_rounds must be <= {}, got {}",
            MAX_ROUNDS, config.max_rounds
        )));
    }

    if !config.min_response_time.is_finite() || config.min_response_time < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min_response_time must be a non-negative number of seconds, got {}",
            config.min_response_time
        )));
    }

    Ok(())
}

/// Validates a seed URL: must parse and use HTTP or HTTPS
pub(crate) fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS scheme",
            seed
        )));
    }

    Ok(())
}

/// Validates network engine configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < 1 || config.poll_interval_ms > MAX_POLL_INTERVAL_MS {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 1 and {}, got {}",
            MAX_POLL_INTERVAL_MS, config.poll_interval_ms
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < config.connect_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs ({}) must not be shorter than connect_timeout_secs ({})",
            config.request_timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_acceptance_config(config: &AcceptanceConfig) -> Result<(), ConfigError> {
    match config {
        AcceptanceConfig::Generic(rules) => validate_generic_rules(rules),
        AcceptanceConfig::Structured(rules) => validate_structured_rules(rules),
    }
}

fn validate_generic_rules(rules: &GenericRules) -> Result<(), ConfigError> {
    if rules.markers.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "generic mode needs at least one marker".to_string(),
        ));
    }

    if rules.markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "markers cannot be empty strings".to_string(),
        ));
    }

    // An empty whitelist would reject every candidate
    if rules.whitelist.is_empty() {
        return Err(ConfigError::Validation(
            "whitelist cannot be empty in generic mode".to_string(),
        ));
    }

    if rules.blacklist.iter().chain(&rules.whitelist).any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "blacklist and whitelist entries cannot be empty".to_string(),
        ));
    }

    validate_content_types(&rules.content_types)
}

/// An empty entry would match every content type
fn validate_content_types(content_types: &[String]) -> Result<(), ConfigError> {
    if content_types.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "content-types entries cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_structured_rules(rules: &StructuredRules) -> Result<(), ConfigError> {
    let base = Url::parse(&rules.base).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base '{}': {}", rules.base, e))
    })?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base '{}' must use HTTP or HTTPS scheme",
            rules.base
        )));
    }

    if rules.rounds.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "structured mode needs at least one round marker".to_string(),
        ));
    }

    for rule in &rules.rounds {
        validate_marker_rule(rule)?;
    }

    validate_content_types(&rules.content_types)
}

fn validate_marker_rule(rule: &MarkerRule) -> Result<(), ConfigError> {
    if rule.start.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "start marker cannot be empty".to_string(),
        ));
    }

    if rule.end.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "marker '{}' has no end delimiters",
            rule.start
        )));
    }

    Ok(())
}
