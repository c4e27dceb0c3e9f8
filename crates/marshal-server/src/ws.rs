//! `WebSocket` endpoint: per-client session loop over the hub.
//!
//! Clients connect to `GET /ws`. Every text frame a client sends is
//! re-broadcast to every connected client, the sender included; payloads
//! are treated as opaque text (consumers key on a `topic` field, the bus
//! does not). Each client additionally receives the `mrd.acq`
//! notifications published by the ingest path.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::debug;

use crate::state::AppState;

/// Bound on a single socket write. A peer that stops draining its TCP
/// window past this long is abandoned; the hub has usually evicted it
/// already via the mailbox bound.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Upgrade an HTTP request to a `WebSocket` session on the bus.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_endpoint(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_client(socket, state))
}

/// Run one client session: register with the hub, then pump frames both
/// directions until the peer goes away or the hub closes the mailbox.
///
/// Writes to the socket happen only here, one at a time, so per-client
/// delivery order matches broadcast order.
async fn handle_client(mut socket: WebSocket, state: Arc<AppState>) {
    let (id, mut mailbox) = state.hub.register();
    debug!(client = id, "WebSocket client connected");

    loop {
        tokio::select! {
            queued = mailbox.recv() => {
                let Some(message) = queued else {
                    // Evicted or shut down by the hub.
                    break;
                };
                match tokio::time::timeout(SEND_TIMEOUT, socket.send(message)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        debug!(client = id, %error, "send failed");
                        break;
                    }
                    Err(_) => {
                        debug!(client = id, "send timed out");
                        break;
                    }
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        // Naive fan-out: everyone, sender included.
                        state.hub.broadcast(text.as_str());
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(error)) => {
                        debug!(client = id, %error, "read failed");
                        break;
                    }
                    // Binary and pong frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.unregister(id);
    debug!(client = id, "WebSocket client disconnected");
}
