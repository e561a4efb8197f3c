//! Webhook intake server.
//!
//! Thin by design: the router parses and filters events, acknowledges the
//! caller synchronously, and launches detached enrichment runs. Everything
//! interesting happens in [`crate::pipeline`].

pub mod config;
pub mod error;
pub mod routes;

pub use config::IntakeConfig;
pub use error::IntakeError;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::EnrichConfig;
use crate::pipeline::EnrichmentPipeline;

/// Build the intake router.
///
/// `POST /api/webhook` is the event intake; `GET /api/health` the liveness
/// probe. Other methods on the webhook path get 405 from the router;
/// OPTIONS preflights are answered by the CORS layer.
pub fn build_router(pipeline: Arc<EnrichmentPipeline>, config: &IntakeConfig) -> Router {
    let cors = if config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/api/webhook", post(routes::webhook))
        .route("/api/health", get(routes::health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout(),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Start the intake server and block until shutdown.
///
/// Initializes structured logging, validates the enrichment configuration,
/// wires the production collaborators, and serves until SIGTERM/Ctrl+C.
pub async fn start_server(intake: IntakeConfig, enrich: EnrichConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&intake.log_level)
        .with_target(false)
        .json()
        .init();

    enrich.validate()?;
    let pipeline = Arc::new(EnrichmentPipeline::from_config(&enrich)?);

    let app = build_router(pipeline, &intake);
    let addr = intake.socket_addr()?;

    tracing::info!(
        "Starting incident-enrich on {} (collection: {}, embedding dim: {})",
        addr,
        enrich.collection_name,
        enrich.embedding_dim
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
