//! Bounded retry with exponential backoff.
//!
//! # Policy
//! - Success ends the loop immediately
//! - Rate-limited attempts (HTTP 429) sleep `2^attempt` units, no jitter
//! - Any other failure sleeps a single unit
//! - Every attempt consumes one slot of the budget
//! - Nothing sleeps after the final attempt; exhaustion is always an error

use std::future::Future;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::upstream::UpstreamError;

/// Result of a single attempt, as seen by the retry loop.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RateLimited,
    Failed(UpstreamError),
}

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
            max_backoff,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_unit_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    /// Delay after a failed attempt (zero-based `attempt`).
    pub fn delay_for(&self, attempt: u32, rate_limited: bool) -> Duration {
        let delay = if rate_limited {
            let factor = 2u32.saturating_pow(attempt);
            self.backoff_unit.saturating_mul(factor)
        } else {
            self.backoff_unit
        };
        delay.min(self.max_backoff)
    }

    /// Longest total time `run` can spend sleeping between attempts.
    pub fn worst_case_backoff(&self) -> Duration {
        let mut total = Duration::ZERO;
        for attempt in 0..self.max_attempts - 1 {
            let delay = self.delay_for(attempt, true);
            if delay.is_zero() {
                break;
            }
            if delay == self.max_backoff {
                let remaining = self.max_attempts - 1 - attempt;
                return total.saturating_add(delay.saturating_mul(remaining));
            }
            total = total.saturating_add(delay);
        }
        total
    }

    /// Drive `op` until it succeeds or the budget is spent.
    ///
    /// `op` receives the zero-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, UpstreamError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        let mut attempt = 0;
        loop {
            let (error, rate_limited) = match op(attempt).await {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::RateLimited => (UpstreamError::RateLimited, true),
                AttemptOutcome::Failed(e) => (e, false),
            };

            tracing::warn!(
                attempt = attempt + 1,
                max_attempts = self.max_attempts,
                error = %error,
                "Upstream attempt failed"
            );

            attempt += 1;
            if attempt >= self.max_attempts {
                return Err(UpstreamError::Exhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.delay_for(attempt - 1, rate_limited);
            tracing::info!(attempt, delay = ?delay, "Retrying upstream request");
            tokio::time::sleep(delay).await;
        }
    }
}
