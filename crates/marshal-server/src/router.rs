//! Axum router construction for both network surfaces.
//!
//! The HTTP API and the `WebSocket` bus bind separate addresses, so each
//! gets its own [`Router`] over the shared [`AppState`].

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Value of the `Server` header on every API response.
const SERVER_HEADER: &str = concat!("marshald/", env!("CARGO_PKG_VERSION"));

/// Per-request deadline on the HTTP API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP API router.
///
/// Routes:
/// - `GET /health` -- liveness + uptime
/// - `GET /v1/config` -- effective configuration
/// - `GET /v1/pose/current` / `POST /v1/pose/update` -- pose store
/// - `POST /v1/mrd/ingest` -- blob archival
/// - `GET /v1/mrd/latest` / `GET /v1/mrd/since` -- index queries
/// - anything else -- `404 {"error":"not found"}`
///
/// The body limit is lifted on this router: blob payloads are bounded by
/// the acquisition hardware, not by the marshal.
pub fn build_api_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/config", get(handlers::get_config))
        .route("/v1/pose/current", get(handlers::pose_current))
        .route("/v1/pose/update", post(handlers::pose_update))
        .route("/v1/mrd/ingest", post(handlers::mrd_ingest))
        .route("/v1/mrd/latest", get(handlers::mrd_latest))
        .route("/v1/mrd/since", get(handlers::mrd_since))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_HEADER),
        ))
        .with_state(state)
}

/// Build the `WebSocket` bus router (`GET /ws` only).
pub fn build_ws_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_endpoint))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_HEADER),
        ))
        .with_state(state)
}
