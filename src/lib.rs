//! Tarot chat relay library.
//!
//! Accepts a question over HTTP, forwards a prompt to a chat-completion API
//! with bounded retries, cleans the returned text and answers with JSON.

pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod status;
pub mod text;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
