//! Runtime configuration snapshot for the marshal.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Advertised cap on index entries, reported by `GET /v1/config`.
pub const MAX_INDEX_ENTRIES: usize = 100_000;

/// Immutable configuration resolved at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct MarshalConfig {
    /// Bind address of the HTTP API (e.g. `0.0.0.0:8080`).
    pub http_bind: String,
    /// Bind address of the `WebSocket` bus (e.g. `0.0.0.0:8090`).
    pub ws_bind: String,
    /// Root of the on-disk archive; blobs live under `<data_dir>/mrd/`.
    pub data_dir: PathBuf,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            http_bind: String::from("0.0.0.0:8080"),
            ws_bind: String::from("0.0.0.0:8090"),
            data_dir: PathBuf::from("/data"),
        }
    }
}

impl MarshalConfig {
    /// The TCP port of the `WebSocket` bind address, as reported by
    /// `GET /v1/config`. Falls back to the default port when the bind
    /// string does not parse (startup validates it either way).
    pub fn ws_port(&self) -> u16 {
        self.ws_bind
            .parse::<SocketAddr>()
            .map(|addr| addr.port())
            .unwrap_or(8090)
    }
}
