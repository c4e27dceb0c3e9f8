//! Integration tests for the marshal HTTP API.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt`
//! without a TCP listener; the blob index runs against a temp
//! directory.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use marshal_server::router::build_api_router;
use marshal_server::{AppState, MarshalConfig};
use marshal_types::IndexEntry;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn make_test_state() -> (TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let config = MarshalConfig {
        data_dir: dir.path().to_path_buf(),
        ..MarshalConfig::default()
    };
    let state = Arc::new(AppState::new(config).await.unwrap());
    (dir, state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

// =========================================================================
// Health and config
// =========================================================================

#[tokio::test]
async fn health_reports_ok_and_uptime() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_s"].is_number());
}

#[tokio::test]
async fn responses_carry_the_server_header() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let server = response.headers().get("server").unwrap().to_str().unwrap();
    assert!(server.starts_with("marshald/"));
}

#[tokio::test]
async fn config_reports_the_snapshot() {
    let (dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(Request::get("/v1/config").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["data_dir"], dir.path().display().to_string());
    assert_eq!(json["ws_port"], 8090);
    assert_eq!(json["max_entries"], 100_000);
}

// =========================================================================
// Pose endpoints
// =========================================================================

#[tokio::test]
async fn pose_current_before_any_update_is_the_zero_pose() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(
            Request::get("/v1/pose/current")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["source"], "fk");
    assert_eq!(json["pose"]["p"], json!([0.0, 0.0, 0.0]));
    assert_eq!(
        json["pose"]["R"],
        json!([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    );
    assert_eq!(json["pose"]["t_ms"], 0);
}

#[tokio::test]
async fn pose_update_then_current_round_trips() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let update = router
        .clone()
        .oneshot(post(
            "/v1/pose/update",
            r#"{"p":[1.0,2.0,3.0],"R":[1,0,0,0,1,0,0,0,1]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(update.status(), StatusCode::OK);
    let echoed = body_to_json(update.into_body()).await;
    assert_eq!(echoed["status"], "ok");
    assert_eq!(echoed["pose"]["p"], json!([1.0, 2.0, 3.0]));
    assert!(echoed["pose"]["ts"].is_string());

    let current = router
        .oneshot(
            Request::get("/v1/pose/current")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(current.status(), StatusCode::OK);
    let json = body_to_json(current.into_body()).await;
    assert_eq!(json["pose"]["p"], json!([1.0, 2.0, 3.0]));
    assert_eq!(
        json["pose"]["R"],
        json!([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    );
    assert_eq!(json["source"], "api");
}

#[tokio::test]
async fn pose_update_missing_fields_is_rejected() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(post("/v1/pose/update", r#"{"R":[1,0,0,0,1,0,0,0,1]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "missing fields");
    assert_eq!(json["required"], json!(["p", "R"]));
}

#[tokio::test]
async fn pose_update_wrong_shapes_reports_lengths() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(post(
            "/v1/pose/update",
            r#"{"p":[1.0,2.0],"R":[1,0,0,0,1,0,0,0,1]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "invalid shapes");
    assert_eq!(json["p_len"], 2);
    assert_eq!(json["R_len"], 9);
}

#[tokio::test]
async fn pose_update_bad_json_reports_what() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(post("/v1/pose/update", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "bad json");
    assert!(json["what"].is_string());
}

// =========================================================================
// Blob ingest and index queries
// =========================================================================

#[tokio::test]
async fn ingest_archives_the_blob_and_returns_its_entry() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(Arc::clone(&state));

    let response = router
        .oneshot(post("/v1/mrd/ingest", "HELLO"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let entry: IndexEntry =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    assert_eq!(entry.seq, 1);
    assert_eq!(entry.size_bytes, 5);
    assert_eq!(entry.kind, "acq");
    assert!(entry.path.ends_with("_000001.mrd"));

    // The blob, the index line, and the latest pointer all agree.
    let blob = tokio::fs::read(&entry.path).await.unwrap();
    assert_eq!(blob, b"HELLO");

    let index_raw = tokio::fs::read_to_string(state.blobs.dir().join("index.jsonl"))
        .await
        .unwrap();
    let lines: Vec<&str> = index_raw.lines().collect();
    assert_eq!(lines.len(), 1);
    let indexed: IndexEntry = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(indexed, entry);

    let latest_raw = tokio::fs::read(state.blobs.dir().join("latest.json"))
        .await
        .unwrap();
    let latest: IndexEntry = serde_json::from_slice(&latest_raw).unwrap();
    assert_eq!(latest, entry);
}

#[tokio::test]
async fn ingest_publishes_a_notification_on_the_bus() {
    let (_dir, state) = make_test_state().await;
    let (_id, mut mailbox) = state.hub.register();
    let router = build_api_router(Arc::clone(&state));

    let response = router
        .oneshot(post("/v1/mrd/ingest", "payload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let frame = mailbox.recv().await.unwrap();
    let axum::extract::ws::Message::Text(text) = frame else {
        panic!("expected a text frame");
    };
    let note: Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(note["topic"], "mrd.acq");
    assert_eq!(note["entry"]["seq"], 1);
}

#[tokio::test]
async fn ingest_rejects_an_empty_body() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(post("/v1/mrd/ingest", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "empty body");
}

#[tokio::test]
async fn sequential_ingests_number_from_one() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    for expected in 1..=10u64 {
        let response = router
            .clone()
            .oneshot(post("/v1/mrd/ingest", "x"))
            .await
            .unwrap();
        let entry: IndexEntry =
            serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
        assert_eq!(entry.seq, expected);
    }
}

#[tokio::test]
async fn latest_is_no_content_before_first_ingest() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(Request::get("/v1/mrd/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn latest_returns_the_newest_entry() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    router
        .clone()
        .oneshot(post("/v1/mrd/ingest", "first"))
        .await
        .unwrap();
    let created = router
        .clone()
        .oneshot(post("/v1/mrd/ingest", "second"))
        .await
        .unwrap();
    let entry: IndexEntry =
        serde_json::from_value(body_to_json(created.into_body()).await).unwrap();

    let response = router
        .oneshot(Request::get("/v1/mrd/latest").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let latest: IndexEntry =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    assert_eq!(latest, entry);
}

#[tokio::test]
async fn since_requires_the_ts_param() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(Request::get("/v1/mrd/since").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "missing ts param");
}

#[tokio::test]
async fn since_from_epoch_honors_the_limit() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    for _ in 0..5 {
        router
            .clone()
            .oneshot(post("/v1/mrd/ingest", "x"))
            .await
            .unwrap();
    }

    let response = router
        .oneshot(
            Request::get("/v1/mrd/since?ts=1970-01-01T00:00:00.000Z&limit=3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let entries: Vec<IndexEntry> =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[tokio::test]
async fn since_filters_strictly_after_the_timestamp() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let mut entries = Vec::new();
    for _ in 0..5 {
        let response = router
            .clone()
            .oneshot(post("/v1/mrd/ingest", "x"))
            .await
            .unwrap();
        let entry: IndexEntry =
            serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
        entries.push(entry);
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    let uri = format!("/v1/mrd/since?ts={}", entries[1].ts);
    let response = router
        .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let matched: Vec<IndexEntry> =
        serde_json::from_value(body_to_json(response.into_body()).await).unwrap();
    let seqs: Vec<u64> = matched.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![3, 4, 5]);
}

// =========================================================================
// Fallback
// =========================================================================

#[tokio::test]
async fn unknown_routes_return_json_404() {
    let (_dir, state) = make_test_state().await;
    let router = build_api_router(state);

    let response = router
        .oneshot(
            Request::get("/v1/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "not found");
}
