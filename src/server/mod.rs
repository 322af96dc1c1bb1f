//! HTTP server exposing the gateway
//!
//! Three routes:
//!
//! - `POST /`: JSON-RPC `tasks/send`
//! - `GET /.well-known/agent.json`: the agent descriptor
//! - `GET /api/ai`: legacy passthrough of a fixed payload

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    config::{ConfigError, GatewayConfig},
    protocol::agent::AgentDescriptor,
    service::TaskDispatcher,
};

/// Body returned by `/api/ai` when the provider call fails
pub const LEGACY_ERROR_MESSAGE: &str = "Failed to fetch data from AI API";

/// Shared application state
#[derive(Clone)]
struct AppState {
    dispatcher: TaskDispatcher,
    descriptor: Arc<AgentDescriptor>,
}

/// Gateway HTTP server
#[derive(Clone)]
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    pub fn new(dispatcher: TaskDispatcher, descriptor: AgentDescriptor) -> Self {
        Self {
            state: AppState {
                dispatcher,
                descriptor: Arc::new(descriptor),
            },
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.dispatcher()?, config.descriptor.clone()))
    }

    /// Build the Axum router for this server
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .route("/.well-known/agent.json", get(get_agent_descriptor))
            .route("/api/ai", get(legacy_ai))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until Ctrl-C
    pub async fn serve<A>(self, addr: A) -> std::io::Result<()>
    where
        A: tokio::net::ToSocketAddrs,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            name = %self.state.descriptor.name,
            address = %listener.local_addr()?,
            providers = ?self.state.dispatcher.registry().ids(),
            "Gateway listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST / - JSON-RPC endpoint
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let reply = state.dispatcher.handle_bytes(&body).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    (status, Json(reply.body)).into_response()
}

/// GET /.well-known/agent.json - Agent descriptor
async fn get_agent_descriptor(State(state): State<AppState>) -> Json<AgentDescriptor> {
    debug!("Serving agent descriptor");
    Json(state.descriptor.as_ref().clone())
}

/// GET /api/ai - Legacy passthrough
async fn legacy_ai(State(state): State<AppState>) -> Response {
    match state.dispatcher.forward_legacy().await {
        Ok(body) => Json(body).into_response(),
        Err(_) => LegacyErrorResponse::new(LEGACY_ERROR_MESSAGE).into_response(),
    }
}

#[derive(Debug, Serialize)]
struct LegacyErrorResponse {
    error: &'static str,
}

impl LegacyErrorResponse {
    fn new(error: &'static str) -> Self {
        Self { error }
    }
}

impl IntoResponse for LegacyErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
