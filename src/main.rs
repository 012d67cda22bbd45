//! Tarot chat relay.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──POST /tarot-chat──▶ ┌───────────────┐    ┌──────────────┐
//!                                  │ chat::handler │───▶│   upstream   │──▶ Completion API
//!     Client ◀──{"answer"}──────── │  validation   │◀───│ retry/backoff│◀──
//!                                  └──────┬────────┘    └──────────────┘
//!                                         │ text::TextCleaner
//!                                         ▼
//!                                  status::ServiceStats ◀── GET / , GET /ping
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tarot_relay::config::load_config;
use tarot_relay::observability::{logging, metrics};
use tarot_relay::{RelayServer, Shutdown};

#[derive(Parser)]
#[command(name = "tarot-relay")]
#[command(about = "HTTP relay between a tarot chat front-end and a completion API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "TAROT_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tarot-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        endpoint = %config.upstream.endpoint,
        model = %config.prompt.model,
        max_attempts = config.upstream.max_attempts,
        "Configuration loaded"
    );

    if config.upstream.api_key.is_none() {
        tracing::warn!(
            variable = %config.upstream.api_key_env,
            "Upstream API key not set; chat requests will fail"
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
