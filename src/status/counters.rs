//! Process-wide request and error counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by every in-flight request.
///
/// `started_at` is fixed at construction; the counters only ever grow.
#[derive(Debug)]
pub struct ServiceStats {
    started_at: Instant,
    requests: AtomicU64,
    errors: AtomicU64,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// Stats whose uptime is measured from `started_at`.
    pub fn started_at(started_at: Instant) -> Self {
        Self {
            started_at,
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn errors_total(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}
