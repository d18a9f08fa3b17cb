//! HTTP server for the coach gateway.
//!
//! Builds the axum router, owns the shared application state, and runs the
//! listener with graceful shutdown. Handlers live in `routes`.

pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::orchestrator::SharedOrchestrator;
use crate::persona::PersonaRegistry;

/// Application state shared across handlers.
///
/// Everything here is read-only after startup: the registry is immutable
/// data and the orchestrator is a stateless client, so handlers run
/// concurrently without locking.
pub struct AppState {
    /// Display name reported by the health endpoint.
    pub service_name: String,

    /// The bundled persona registry.
    pub registry: PersonaRegistry,

    /// The orchestrator every request delegates to.
    pub orchestrator: SharedOrchestrator,
}

impl AppState {
    pub fn new(
        service_name: impl Into<String>,
        registry: PersonaRegistry,
        orchestrator: SharedOrchestrator,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            registry,
            orchestrator,
        }
    }
}

/// Shared handle handlers receive through the `State` extractor.
pub type SharedState = Arc<AppState>;

/// Create the API router
pub fn create_router(state: SharedState, permissive_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health_check))
        .route("/chat", post(routes::chat))
        .route("/readiness", post(routes::calculate_readiness))
        .route("/generate-plan", post(routes::generate_plan))
        .route("/voice/transcribe", post(routes::transcribe_voice))
        .route("/voice/synthesize", post(routes::synthesize_voice))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run(config: &GatewayConfig, state: SharedState) -> Result<()> {
    let app = create_router(state, config.service.permissive_cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        Error::Config(format!("Failed to bind {}: {}", addr, e))
    })?;

    info!(addr = %addr, "Listening for requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
