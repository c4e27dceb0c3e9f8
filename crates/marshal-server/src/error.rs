//! Error types for the HTTP API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! converts into an HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body is JSON and carries an `"error"` string field; validation
//! errors carry the structured detail fields clients key on.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use marshal_store::StoreError;

/// Errors that can occur while handling an API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not parseable JSON (or held values of the
    /// wrong type where numbers were required).
    #[error("bad json: {0}")]
    BadJson(String),

    /// A pose update without the required `p` and `R` fields.
    #[error("missing fields")]
    MissingFields,

    /// A pose update whose `p` or `R` arrays have the wrong length.
    #[error("invalid shapes: p_len={p_len} R_len={r_len}")]
    InvalidShapes {
        /// Observed length of `p` (0 when not an array).
        p_len: usize,
        /// Observed length of `R` (0 when not an array).
        r_len: usize,
    },

    /// An ingest with a zero-length body.
    #[error("empty body")]
    EmptyBody,

    /// A since-query without the required `ts` parameter.
    #[error("missing ts param")]
    MissingTs,

    /// No route matched the request.
    #[error("not found")]
    NotFound,

    /// The blob archival pipeline failed.
    #[error("ingest failed")]
    Ingest(#[source] StoreError),

    /// The latest pointer exists but could not be read.
    #[error("latest failed")]
    Latest(#[source] StoreError),

    /// The index log could not be read.
    #[error("since failed")]
    Since(#[source] StoreError),

    /// A response body could not be encoded.
    #[error("encoding failed")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadJson(what) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "bad json", "what": what}),
            ),
            Self::MissingFields => (
                StatusCode::BAD_REQUEST,
                json!({"error": "missing fields", "required": ["p", "R"]}),
            ),
            Self::InvalidShapes { p_len, r_len } => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid shapes", "p_len": p_len, "R_len": r_len}),
            ),
            Self::EmptyBody => (StatusCode::BAD_REQUEST, json!({"error": "empty body"})),
            Self::MissingTs => (
                StatusCode::BAD_REQUEST,
                json!({"error": "missing ts param"}),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, json!({"error": "not found"})),
            Self::Ingest(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "ingest failed", "what": cause.to_string()}),
            ),
            Self::Latest(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "latest failed", "what": cause.to_string()}),
            ),
            Self::Since(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "since failed", "what": cause.to_string()}),
            ),
            Self::Encode(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "encoding failed", "what": cause.to_string()}),
            ),
        };

        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }

        (status, Json(body)).into_response()
    }
}
