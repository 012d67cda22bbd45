//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic capture, CORS, body limit)
//! - Bind server to listener
//! - Stop on Ctrl+C or a shutdown broadcast

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::chat::{tarot_chat, ChatService};
use crate::config::{RelayConfig, ServiceConfig};
use crate::error::error_body;
use crate::lifecycle::shutdown::requested as shutdown_requested;
use crate::status::{handlers, ServiceStats, StatusReporter};
use crate::upstream::UpstreamError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub status: StatusReporter,
    pub stats: Arc<ServiceStats>,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    stats: Arc<ServiceStats>,
}

impl RelayServer {
    /// Create a new server. The service start time is captured here.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamError> {
        let stats = Arc::new(ServiceStats::new());
        let chat = Arc::new(ChatService::new(&config, stats.clone())?);
        let status = StatusReporter::new(stats.clone(), &config.service);

        let state = AppState {
            chat,
            status,
            stats: stats.clone(),
        };

        let router = Self::build_router(&config.service, state);
        Ok(Self { router, stats })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The chat request timeout lives in `ChatService` so that expiry is
    /// counted and answered with a JSON body.
    fn build_router(service: &ServiceConfig, state: AppState) -> Router {
        let panic_stats = state.stats.clone();

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors_layer(&service.cors_origins))
            .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
                panic_stats.record_error();
                panic_response(panic)
            }));

        Router::new()
            .route("/", get(handlers::home))
            .route("/ping", get(handlers::ping))
            .route("/tarot-chat", post(tarot_chat))
            .layer(DefaultBodyLimit::max(service.max_body_bytes))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown_requested(&mut shutdown) => {}
                }
            })
            .await?;

        tracing::info!(
            requests_total = self.stats.requests_total(),
            errors_total = self.stats.errors_total(),
            "HTTP server stopped"
        );
        Ok(())
    }

    /// A clone of the router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn stats(&self) -> &Arc<ServiceStats> {
        &self.stats
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };

    tracing::error!(error = %message, "Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error_body(message))).into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
