//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: PORT, API key)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed to RelayServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the relay runs with no file at all
//! - The upstream credential only ever comes from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AnswerConfig, ListenerConfig, LogFormat, ObservabilityConfig, PromptConfig, RelayConfig,
    ServiceConfig, UpstreamConfig,
};
