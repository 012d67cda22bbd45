//! Upstream completion subsystem.
//!
//! # Data Flow
//! ```text
//! CompletionRequest
//!     → client.rs (POST with Bearer auth, per-attempt timeout)
//!     → retry.rs (classify outcome, backoff, bounded attempts)
//!     → CompletionResponse (types.rs) or UpstreamError
//! ```

pub mod client;
pub mod retry;
pub mod types;

use thiserror::Error;

pub use client::UpstreamClient;
pub use retry::{AttemptOutcome, RetryPolicy};
pub use types::{ChatMessage, CompletionRequest, CompletionResponse, MessageContent, Role};

/// Failure talking to the upstream API.
///
/// Messages are returned to callers, so they never include the credential.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream API credential is not configured")]
    MissingCredential,

    #[error("upstream API error: status {0}")]
    Status(u16),

    #[error("upstream API rate limit exceeded")]
    RateLimited,

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),

    #[error("upstream API failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<UpstreamError>,
    },
}
