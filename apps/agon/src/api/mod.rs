//! # Agon HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check
//! - `GET  /status` - Archive status
//! - `POST /arguments` - Submit a record
//! - `POST /debates` - Open a debate session
//! - `GET  /arguments/{prefix}` - Resolve a prefix and load the record
//! - `GET  /arguments/{prefix}/chain` - Relationship chain from a root
//! - `GET  /debates/{prefix}/consensus` - Consensus status
//! - `POST /debates/{prefix}/votes` - Cast a closing vote
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `AGON_CORS_ORIGINS`: Comma-separated list of allowed origins, or
//!   "*" for all (default: localhost only)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `agon::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    chain_handler, consensus_handler, health_handler, open_debate_handler, record_handler,
    status_handler, submit_handler, vote_handler,
};
#[allow(unused_imports)]
pub use types::{
    ChainNodeJson, ChainResponse, ConsensusResponse, ErrorResponse, HealthResponse,
    OpenDebateRequest, OpenDebateResponse, RecordResponse, StatusResponse, SubmitRequest,
    SubmitResponse, VoteRequest, VoteResponse,
};

use agon_core::{AgonError, Archive};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the archive.
#[derive(Clone)]
pub struct AppState {
    /// The archive behind a read/write lock.
    pub archive: Arc<RwLock<Archive>>,
}

impl AppState {
    /// Create new app state with an archive.
    #[must_use]
    pub fn new(archive: Archive) -> Self {
        Self {
            archive: Arc::new(RwLock::new(archive)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `AGON_CORS_ORIGINS`:
/// - If "*": allows all origins (development mode)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("AGON_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (AGON_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in AGON_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No AGON_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit - bounds request payloads
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/arguments", post(handlers::submit_handler))
        .route("/debates", post(handlers::open_debate_handler))
        .route("/arguments/{prefix}", get(handlers::record_handler))
        .route("/arguments/{prefix}/chain", get(handlers::chain_handler))
        .route(
            "/debates/{prefix}/consensus",
            get(handlers::consensus_handler),
        )
        .route("/debates/{prefix}/votes", post(handlers::vote_handler))
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, archive: Archive) -> Result<(), AgonError> {
    let state = AppState::new(archive);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AgonError::storage("bind", e))?;

    tracing::info!("Agon HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| AgonError::storage("serve", e))
}
