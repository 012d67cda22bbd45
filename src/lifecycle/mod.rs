//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Build server → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or Shutdown::trigger → shutdown::requested → Stop accepting
//!     → Drain in-flight → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
