//! Chat request handling.
//!
//! # Flow
//! ```text
//! body → content type check → JSON parse → `question` lookup → trim
//!     → PromptBuilder → UpstreamClient::call → first choice → TextCleaner
//!     → 200 {"answer"} | 400/500/502 {"error"}
//! ```
//!
//! The request counter is bumped once on entry; the error counter once on
//! the single error exit. Unreadable bodies and requests that outlive
//! `service.request_timeout_secs` leave through the same exit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::chat::prompt::PromptBuilder;
use crate::config::RelayConfig;
use crate::error::{error_body, RelayError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::status::ServiceStats;
use crate::text::TextCleaner;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Orchestrates validation, the upstream call and answer cleanup.
#[derive(Debug)]
pub struct ChatService {
    prompt: PromptBuilder,
    upstream: UpstreamClient,
    cleaner: TextCleaner,
    stats: Arc<ServiceStats>,
    reject_empty_question: bool,
    request_timeout: Duration,
}

impl ChatService {
    pub fn new(config: &RelayConfig, stats: Arc<ServiceStats>) -> Result<Self, UpstreamError> {
        Ok(Self {
            prompt: PromptBuilder::new(config.prompt.clone()),
            upstream: UpstreamClient::new(&config.upstream)?,
            cleaner: TextCleaner::new(&config.answer),
            stats,
            reject_empty_question: config.prompt.reject_empty_question,
            request_timeout: Duration::from_secs(config.service.request_timeout_secs),
        })
    }

    /// Handle one inbound payload, returning the status and JSON body.
    pub async fn handle(&self, content_type: Option<&str>, body: &[u8]) -> (StatusCode, Value) {
        self.stats.record_request();
        let start = Instant::now();

        let result = tokio::time::timeout(self.request_timeout, self.answer(content_type, body))
            .await
            .unwrap_or_else(|_| Err(RelayError::Timeout(self.request_timeout.as_secs())));

        self.respond(start, result)
    }

    /// Count and answer a request whose body axum could not read.
    pub fn reject(&self, rejection: BytesRejection) -> (StatusCode, Value) {
        self.stats.record_request();
        let err = RelayError::validation(format!("request body rejected: {}", rejection.body_text()));
        self.respond(Instant::now(), Err(err))
    }

    fn respond(&self, start: Instant, result: Result<String, RelayError>) -> (StatusCode, Value) {
        match result {
            Ok(answer) => {
                metrics::record_chat("ok", start);
                tracing::info!(
                    answer_words = answer.split_whitespace().count(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Answer delivered"
                );
                (StatusCode::OK, json!({ "answer": answer }))
            }
            Err(err) => {
                self.stats.record_error();
                metrics::record_chat(err.kind(), start);
                let status = err.status_code();
                if status.is_server_error() {
                    tracing::error!(kind = err.kind(), status = status.as_u16(), error = %err, "Chat request failed");
                } else {
                    tracing::warn!(kind = err.kind(), status = status.as_u16(), error = %err, "Chat request rejected");
                }
                (status, error_body(err.to_string()))
            }
        }
    }

    async fn answer(&self, content_type: Option<&str>, body: &[u8]) -> Result<String, RelayError> {
        let question = self.extract_question(content_type, body)?;
        tracing::debug!(question_chars = question.chars().count(), "Question accepted");

        let request = self.prompt.build(&question);
        let response = self.upstream.call(&request).await?;

        if response.choices.is_empty() {
            return Err(RelayError::EmptyAnswer);
        }
        let content = response.first_content().ok_or(RelayError::MalformedAnswer)?;

        Ok(self.cleaner.process_content(content))
    }

    fn extract_question(&self, content_type: Option<&str>, body: &[u8]) -> Result<String, RelayError> {
        if !content_type.is_some_and(is_json_content_type) {
            return Err(RelayError::validation("JSON body required"));
        }

        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| RelayError::validation(format!("malformed JSON body: {}", e)))?;

        let question = match payload.get("question") {
            Some(Value::String(question)) => question.trim().to_string(),
            Some(_) => return Err(RelayError::validation("question must be a string")),
            None => return Err(RelayError::validation("question is missing")),
        };

        if self.reject_empty_question && question.is_empty() {
            return Err(RelayError::validation("question is empty"));
        }

        Ok(question)
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// `POST /tarot-chat`.
pub async fn tarot_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let (status, body) = match body {
        Ok(body) => state.chat.handle(content_type, &body).await,
        Err(rejection) => state.chat.reject(rejection),
    };
    (status, Json(body))
}
