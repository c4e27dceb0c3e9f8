//! HTTP API and WebSocket bus for the acquisition data marshal.
//!
//! This crate provides the two network surfaces of the marshal:
//!
//! - **REST endpoints** for pose updates, blob ingest, and index queries
//!   (`/health`, `/v1/config`, `/v1/pose/*`, `/v1/mrd/*`), served on the
//!   HTTP bind address.
//! - **`WebSocket` bus** (`/ws`) on its own bind address: every text
//!   frame received from a client is re-broadcast to every connected
//!   client, and each successful blob ingest publishes an `mrd.acq`
//!   notification onto the same bus.
//!
//! # Architecture
//!
//! Both surfaces share one [`AppState`] holding the pose store, the blob
//! index, and the [`WsHub`]. The hub keeps a registry of per-client
//! mailboxes; broadcast snapshots the registry and never blocks on a
//! slow socket -- a client whose mailbox overflows is dropped rather
//! than buffered.

pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::MarshalConfig;
pub use error::ApiError;
pub use hub::WsHub;
pub use router::{build_api_router, build_ws_router};
pub use server::{ServerError, start_servers};
pub use state::AppState;
