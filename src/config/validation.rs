//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0, sampling parameters)
//! - Check the upstream endpoint and metrics address parse
//! - Check the request timeout covers the whole upstream retry budget
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::config::schema::RelayConfig;
use crate::upstream::RetryPolicy;

/// Placeholder the prompt template must contain.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., `upstream.max_attempts`).
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstream = &config.upstream;
    match Url::parse(&upstream.endpoint) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "upstream.endpoint",
            format!("invalid URL: {}", e),
        )),
    }
    if upstream.api_key_env.trim().is_empty() {
        errors.push(ValidationError::new("upstream.api_key_env", "must not be empty"));
    }
    if upstream.max_attempts == 0 {
        errors.push(ValidationError::new("upstream.max_attempts", "must be at least 1"));
    }
    if upstream.attempt_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.attempt_timeout_secs", "must be greater than 0"));
    }

    let prompt = &config.prompt;
    if prompt.model.trim().is_empty() {
        errors.push(ValidationError::new("prompt.model", "must not be empty"));
    }
    if !prompt.template.contains(QUESTION_PLACEHOLDER) {
        errors.push(ValidationError::new(
            "prompt.template",
            format!("must contain the {} placeholder", QUESTION_PLACEHOLDER),
        ));
    }
    if !(0.0..=2.0).contains(&prompt.temperature) {
        errors.push(ValidationError::new("prompt.temperature", "must be within 0.0..=2.0"));
    }
    if !(0.0..=1.0).contains(&prompt.top_p) || prompt.top_p == 0.0 {
        errors.push(ValidationError::new("prompt.top_p", "must be within (0.0, 1.0]"));
    }
    if prompt.max_tokens == 0 {
        errors.push(ValidationError::new("prompt.max_tokens", "must be greater than 0"));
    }

    let answer = &config.answer;
    if answer.max_words == 0 {
        errors.push(ValidationError::new("answer.max_words", "must be greater than 0"));
    }
    if answer.truncate_words > answer.max_words {
        errors.push(ValidationError::new(
            "answer.truncate_words",
            "must not exceed answer.max_words",
        ));
    }

    let service = &config.service;
    if service.request_timeout_secs == 0 {
        errors.push(ValidationError::new("service.request_timeout_secs", "must be greater than 0"));
    }
    if service.request_timeout_secs > 0 && upstream.max_attempts > 0 {
        let budget = Duration::from_secs(upstream.attempt_timeout_secs)
            .saturating_mul(upstream.max_attempts)
            .saturating_add(RetryPolicy::from_config(upstream).worst_case_backoff());
        if Duration::from_secs(service.request_timeout_secs) < budget {
            errors.push(ValidationError::new(
                "service.request_timeout_secs",
                format!("must cover the upstream retry budget of {}s", budget.as_secs_f64().ceil()),
            ));
        }
    }
    if service.max_body_bytes == 0 {
        errors.push(ValidationError::new("service.max_body_bytes", "must be greater than 0"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
