//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request ID assigned, span opened, CORS preflight answered
//!     → GET /, GET /ping  → status::handlers
//!     → POST /tarot-chat  → chat::handler
//!     → JSON response (request ID echoed back)
//! ```

pub mod server;

pub use server::{AppState, RelayServer};
