//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (logging.rs installs the subscriber)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) attached to every request span
//! - Metrics are cheap (atomic increments) and no-ops when disabled

pub mod logging;
pub mod metrics;
