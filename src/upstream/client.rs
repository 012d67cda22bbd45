//! Outbound chat-completion client.
//!
//! # Responsibilities
//! - POST a `CompletionRequest` with Bearer auth
//! - Enforce the per-attempt timeout
//! - Classify each HTTP outcome for the retry loop
//! - Decode the successful body into `CompletionResponse`

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::retry::{AttemptOutcome, RetryPolicy};
use crate::upstream::types::{CompletionRequest, CompletionResponse};
use crate::upstream::UpstreamError;

/// Client for the upstream completion API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    policy: RetryPolicy,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.attempt_timeout_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Send `request`, retrying per the configured policy.
    pub async fn call(&self, request: &CompletionRequest) -> Result<CompletionResponse, UpstreamError> {
        let api_key = self.api_key.as_ref().ok_or(UpstreamError::MissingCredential)?;

        let response = self
            .policy
            .run(|attempt| self.attempt(request, api_key, attempt))
            .await?;

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        api_key: &SecretString,
        attempt: u32,
    ) -> AttemptOutcome<reqwest::Response> {
        tracing::debug!(attempt = attempt + 1, model = %request.model, "Calling upstream");

        let result = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .json(request)
            .send()
            .await;

        match result {
            Ok(response) => match response.status() {
                StatusCode::OK => {
                    metrics::record_upstream_attempt("success");
                    AttemptOutcome::Success(response)
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    metrics::record_upstream_attempt("rate_limited");
                    AttemptOutcome::RateLimited
                }
                status => {
                    metrics::record_upstream_attempt("status");
                    AttemptOutcome::Failed(UpstreamError::Status(status.as_u16()))
                }
            },
            Err(e) => {
                metrics::record_upstream_attempt(if e.is_timeout() { "timeout" } else { "transport" });
                AttemptOutcome::Failed(UpstreamError::Transport(e.without_url()))
            }
        }
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &self.api_key.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}
