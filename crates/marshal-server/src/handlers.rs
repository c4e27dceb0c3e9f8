//! REST endpoint handlers for the marshal API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness + uptime |
//! | `GET`  | `/v1/config` | Effective configuration |
//! | `GET`  | `/v1/pose/current` | Most recent pose |
//! | `POST` | `/v1/pose/update` | Replace the current pose |
//! | `POST` | `/v1/mrd/ingest` | Archive an opaque blob |
//! | `GET`  | `/v1/mrd/latest` | Raw `latest.json` pointer |
//! | `GET`  | `/v1/mrd/since` | Index entries newer than a timestamp |

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::{Value, json};

use marshal_store::StoreError;
use marshal_types::{Pose, iso8601_now};
use marshal_types::pose::{DEFAULT_FRAME, SOURCE_API};

use crate::config::MAX_INDEX_ENTRIES;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe with seconds-since-start.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_s": state.started.elapsed().as_secs_f64(),
    }))
}

// ---------------------------------------------------------------------------
// GET /v1/config
// ---------------------------------------------------------------------------

/// Effective configuration of this marshal instance.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "data_dir": state.config.data_dir.display().to_string(),
        "ws_port": state.config.ws_port(),
        "max_entries": MAX_INDEX_ENTRIES,
    }))
}

// ---------------------------------------------------------------------------
// GET /v1/pose/current
// ---------------------------------------------------------------------------

/// Snapshot of the most recent pose.
///
/// The embedded `ts` field carries the response time, not the pose's own
/// instant; `t_ms` remains the producer timestamp.
pub async fn pose_current(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let pose = state.poses.get();
    let jpose = pose_with_response_ts(&pose)?;
    Ok(Json(json!({"pose": jpose, "source": pose.source})))
}

// ---------------------------------------------------------------------------
// POST /v1/pose/update
// ---------------------------------------------------------------------------

/// Validate and store a pose update, echoing the stored pose.
///
/// Body: `{"p":[x,y,z], "R":[9 numbers], "frame"?: str, "source"?: str}`.
pub async fn pose_update(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let pose = parse_pose_update(&body)?;
    state.poses.set(pose.clone());

    let jpose = pose_with_response_ts(&pose)?;
    Ok(Json(json!({"status": "ok", "pose": jpose})))
}

// ---------------------------------------------------------------------------
// POST /v1/mrd/ingest
// ---------------------------------------------------------------------------

/// Archive the raw request body as a blob.
///
/// On success the returned entry is already durable in `index.jsonl` and
/// `latest.json`, and an `mrd.acq` notification has been offered to every
/// `WebSocket` subscriber.
pub async fn mrd_ingest(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state.blobs.ingest(&body).await.map_err(|e| match e {
        StoreError::EmptyBlob => ApiError::EmptyBody,
        other => ApiError::Ingest(other),
    })?;

    let note = json!({"topic": "mrd.acq", "entry": entry});
    state.hub.broadcast(&note.to_string());

    Ok((StatusCode::CREATED, Json(entry)))
}

// ---------------------------------------------------------------------------
// GET /v1/mrd/latest
// ---------------------------------------------------------------------------

/// Raw contents of `latest.json`, or `204 No Content` before the first
/// ingest. The bytes are passed through without validation.
pub async fn mrd_latest(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.blobs.latest().await.map_err(ApiError::Latest)? {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/mrd/since?ts=...&limit=...
// ---------------------------------------------------------------------------

/// Index entries with `ts` strictly greater than the query timestamp.
///
/// `ts` is required; `limit` is optional (0 or unparseable means
/// unlimited).
pub async fn mrd_since(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let ts = params
        .get("ts")
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingTs)?;
    let limit = params
        .get("limit")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);

    let entries = state
        .blobs
        .since(ts, limit)
        .await
        .map_err(ApiError::Since)?;
    Ok(Json(entries))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// 404 for every unknown route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse and validate a pose-update body.
///
/// Distinguishes the three client mistakes the API reports separately:
/// unparseable JSON, missing `p`/`R`, and wrong array shapes. Non-numeric
/// array elements count as bad JSON.
fn parse_pose_update(body: &[u8]) -> Result<Pose, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadJson(e.to_string()))?;

    let (Some(p), Some(r)) = (value.get("p"), value.get("R")) else {
        return Err(ApiError::MissingFields);
    };

    let p_len = p.as_array().map_or(0, Vec::len);
    let r_len = r.as_array().map_or(0, Vec::len);
    if p_len != 3 || r_len != 9 {
        return Err(ApiError::InvalidShapes { p_len, r_len });
    }

    let mut pose = Pose {
        t: Utc::now(),
        frame: value
            .get("frame")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FRAME)
            .to_owned(),
        source: value
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or(SOURCE_API)
            .to_owned(),
        ..Pose::default()
    };
    for (i, item) in p.as_array().into_iter().flatten().enumerate() {
        pose.p[i] = item
            .as_f64()
            .ok_or_else(|| ApiError::BadJson(format!("p[{i}] is not a number")))?;
    }
    for (i, item) in r.as_array().into_iter().flatten().enumerate() {
        pose.r[i] = item
            .as_f64()
            .ok_or_else(|| ApiError::BadJson(format!("R[{i}] is not a number")))?;
    }

    Ok(pose)
}

/// Pose JSON with a second-precision `ts` stamped at response time.
fn pose_with_response_ts(pose: &Pose) -> Result<Value, ApiError> {
    let mut jpose = serde_json::to_value(pose)?;
    jpose["ts"] = Value::String(iso8601_now());
    Ok(jpose)
}
