//! `marshald` -- data marshal daemon for the lab acquisition pipeline.
//!
//! Wires the persistence layer to the two network surfaces and runs
//! until a termination signal.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Parse CLI flags into the immutable configuration snapshot
//! 3. Open the blob index under the data directory (resuming the
//!    sequence counter from an existing index)
//! 4. Serve the HTTP API and the `WebSocket` bus until SIGINT/SIGTERM

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use marshal_server::{AppState, MarshalConfig, start_servers};

use crate::error::DaemonError;

#[derive(Parser)]
#[command(name = "marshald")]
#[command(about = "Data marshal for the lab acquisition pipeline", version)]
struct Cli {
    /// HTTP API bind address.
    #[arg(long, value_name = "HOST:PORT", default_value = "0.0.0.0:8080")]
    http: String,

    /// WebSocket bus bind address.
    #[arg(long, value_name = "HOST:PORT", default_value = "0.0.0.0:8090")]
    ws: String,

    /// Data directory for blob archival.
    #[arg(long, value_name = "DIR", default_value = "/data")]
    data: PathBuf,
}

/// Application entry point.
///
/// Exits 0 only on clean shutdown.
///
/// # Errors
///
/// Returns an error if the data directory cannot be prepared or a
/// listener cannot bind.
#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = MarshalConfig {
        http_bind: cli.http,
        ws_bind: cli.ws,
        data_dir: cli.data,
    };

    info!(
        http = config.http_bind,
        ws = config.ws_bind,
        data_dir = %config.data_dir.display(),
        "marshald starting"
    );

    let state = Arc::new(AppState::new(config.clone()).await?);
    start_servers(&config, state).await?;

    info!("marshald shutdown complete");
    Ok(())
}
