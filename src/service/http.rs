//! HTTP command surface and Prometheus metrics endpoint
//!
//! Every scheduler command is reachable over a small JSON API served by Axum.
//! Rejected commands answer with `{"error": <kind>, "message": <text>}`.

use crate::error::PairingError;
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::types::{MatchId, MatchState, Participant, ServerSlot};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Body of `POST /run` and `POST /run/reshuffle`
#[derive(Debug, Default, Deserialize)]
pub struct PairRequest {
    /// Explicit roster; the configured provider is used when absent
    #[serde(default)]
    pub roster: Option<Vec<Participant>>,
}

#[derive(Debug, Deserialize)]
pub struct ServerRequest {
    pub slot: ServerSlot,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub state: MatchState,
}

/// JSON error response carrying a stable error kind
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<PairingError>() {
            Some(pairing) => Self {
                status: status_for(pairing),
                kind: pairing.kind(),
                message: pairing.to_string(),
            },
            None => {
                error!("Command failed: {:#}", err);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal_error",
                    message: format!("{:#}", err),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.kind,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

/// HTTP status for each scheduler error kind
pub fn status_for(err: &PairingError) -> StatusCode {
    match err {
        PairingError::InsufficientParticipants { .. }
        | PairingError::DuplicateParticipant { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PairingError::MatchNotFound { .. } | PairingError::NoActiveRun => StatusCode::NOT_FOUND,
        PairingError::InvalidTransition { .. } => StatusCode::CONFLICT,
        PairingError::ExportFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// HTTP server exposing the command surface
pub struct HttpServer {
    config: HttpServerConfig,
    app_state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, app_state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            app_state,
            shutdown_tx,
        }
    }

    /// Serve until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid HTTP server address")?;

        let app = create_router(self.app_state.clone());
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}

/// Build the router with all command and monitoring endpoints
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/alive", get(alive_handler))
        .route("/metrics", get(metrics_handler))
        .route("/run", get(current_run_handler).post(generate_handler))
        .route("/run/reshuffle", post(reshuffle_handler))
        .route("/run/summary", get(summary_handler))
        .route("/run/export", get(export_handler))
        .route("/matches/{id}/server", put(set_server_handler))
        .route("/matches/{id}/server/swap", post(swap_server_handler))
        .route("/matches/{id}/status", put(status_handler))
        .with_state(app_state)
}

fn parse_match_id(raw: &str) -> Result<MatchId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid match id: {}", raw)))
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "court-rotation",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/alive",
            "/metrics",
            "/run",
            "/run/reshuffle",
            "/run/summary",
            "/run/export",
            "/matches/{id}/server",
            "/matches/{id}/server/swap",
            "/matches/{id}/status"
        ]
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    Json(HealthCheck::check(state).await)
}

async fn alive_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Liveness check requested");

    match HealthCheck::liveness_check(&state) {
        HealthStatus::Healthy => (StatusCode::OK, "Alive"),
        HealthStatus::Degraded => (StatusCode::OK, "Alive, scheduler busy"),
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    debug!("Metrics endpoint requested");

    let metrics = state.metrics();
    metrics.update_uptime(state.uptime());

    match metrics.gather_text() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

async fn current_run_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let run = state.current_run().await?;
    Ok(Json(run).into_response())
}

async fn summary_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let summary = state.summary().await?;
    Ok(Json(summary).into_response())
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Option<Json<PairRequest>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let roster = body?.and_then(|Json(request)| request.roster);
    let run = state.generate(roster).await?;
    Ok((StatusCode::CREATED, Json(run)).into_response())
}

async fn reshuffle_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Option<Json<PairRequest>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let roster = body?.and_then(|Json(request)| request.roster);
    let run = state.reshuffle(roster).await?;
    Ok((StatusCode::CREATED, Json(run)).into_response())
}

async fn set_server_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<ServerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let match_id = parse_match_id(&id)?;
    let Json(request) = body?;
    let updated = state.set_server(match_id, request.slot).await?;
    Ok(Json(updated).into_response())
}

async fn swap_server_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let match_id = parse_match_id(&id)?;
    let updated = state.swap_server(match_id).await?;
    Ok(Json(updated).into_response())
}

async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let match_id = parse_match_id(&id)?;
    let Json(request) = body?;
    let updated = state.transition(match_id, request.state).await?;
    Ok(Json(updated).into_response())
}

async fn export_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let exported = state.export_fixtures().await?;
    let disposition = format!("attachment; filename=\"{}\"", exported.filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.csv,
    )
        .into_response())
}
