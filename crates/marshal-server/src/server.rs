//! Server lifecycle: bind both listeners, serve until a shutdown signal.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::MarshalConfig;
use crate::router::{build_api_router, build_ws_router};
use crate::state::AppState;

/// Errors that can occur when starting or running the marshal servers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind a network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// A server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Run the HTTP API and the `WebSocket` bus until SIGINT or SIGTERM.
///
/// Both listeners are bound eagerly so a bad address fails startup
/// instead of surfacing later. On a shutdown signal the acceptors close,
/// the hub drops every client mailbox (which terminates the long-lived
/// `WebSocket` sessions), and in-flight requests run to completion.
/// Returns `Ok(())` only on clean shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if an address does not parse or cannot
/// be bound, and [`ServerError::Serve`] for fatal I/O while serving.
pub async fn start_servers(
    config: &MarshalConfig,
    state: Arc<AppState>,
) -> Result<(), ServerError> {
    let http_addr: SocketAddr = config
        .http_bind
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid http address {}: {e}", config.http_bind)))?;
    let ws_addr: SocketAddr = config
        .ws_bind
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid ws address {}: {e}", config.ws_bind)))?;

    let api_listener = TcpListener::bind(http_addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {http_addr}: {e}")))?;
    let ws_listener = TcpListener::bind(ws_addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {ws_addr}: {e}")))?;

    info!(
        http = %http_addr,
        ws = %ws_addr,
        data_dir = %state.config.data_dir.display(),
        "marshal listening"
    );

    // Long-lived WebSocket sessions would otherwise hold graceful
    // shutdown open forever; closing the mailboxes ends their tasks.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            shutdown_signal().await;
            state.hub.close_all();
        });
    }

    let api_router = build_api_router(Arc::clone(&state));
    let ws_router = build_ws_router(state);

    let (api_result, ws_result) = tokio::join!(
        async {
            axum::serve(api_listener, api_router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        },
        async {
            axum::serve(ws_listener, ws_router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        },
    );

    api_result.map_err(|e| ServerError::Serve(format!("http api: {e}")))?;
    ws_result.map_err(|e| ServerError::Serve(format!("websocket bus: {e}")))?;

    info!("marshal shut down cleanly");
    Ok(())
}

/// Resolve once SIGINT (Ctrl-C) or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
