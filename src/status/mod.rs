//! Status reporting.
//!
//! Read-only views over `ServiceStats` for the `/` and `/ping` endpoints.

pub mod counters;
pub mod handlers;

use std::sync::Arc;

use serde::Serialize;

use crate::config::ServiceConfig;

pub use counters::ServiceStats;

/// Compiler version captured by the build script.
pub const RUST_VERSION: &str = env!("RELAY_RUSTC_VERSION");

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct HomeStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub requests_total: u64,
    pub version: String,
}

/// Body of `GET /ping`.
#[derive(Debug, Serialize)]
pub struct PingStatus {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub requests_total: u64,
    pub errors_total: u64,
    pub rust_version: &'static str,
}

/// Renders the shared counters.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    stats: Arc<ServiceStats>,
    banner: String,
    version_label: String,
}

impl StatusReporter {
    pub fn new(stats: Arc<ServiceStats>, config: &ServiceConfig) -> Self {
        Self {
            stats,
            banner: config.banner.clone(),
            version_label: config.version_label.clone(),
        }
    }

    pub fn home(&self) -> HomeStatus {
        HomeStatus {
            status: self.banner.clone(),
            uptime_seconds: self.stats.uptime().as_secs(),
            requests_total: self.stats.requests_total(),
            version: self.version_label.clone(),
        }
    }

    pub fn ping(&self) -> PingStatus {
        PingStatus {
            status: "alive",
            uptime_seconds: self.stats.uptime().as_secs(),
            requests_total: self.stats.requests_total(),
            errors_total: self.stats.errors_total(),
            rust_version: RUST_VERSION,
        }
    }
}
