//! Shared application state for both network surfaces.

use std::time::Instant;

use marshal_store::{BlobIndex, PoseStore, StoreError};

use crate::config::MarshalConfig;
use crate::hub::WsHub;

/// State shared by the HTTP API and the `WebSocket` bus.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. Each component guards its own interior state; nothing
/// here requires an outer lock.
pub struct AppState {
    /// Immutable configuration snapshot.
    pub config: MarshalConfig,
    /// Most recent pose, replaced on every `POST /v1/pose/update`.
    pub poses: PoseStore,
    /// Durable blob archive and index.
    pub blobs: BlobIndex,
    /// Broadcast registry of connected `WebSocket` clients.
    pub hub: WsHub,
    /// Process start, for the `/health` uptime report.
    pub started: Instant,
}

impl AppState {
    /// Build the shared state, opening (and if needed creating) the blob
    /// directory under the configured data dir.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the data directory cannot be
    /// prepared or an existing index cannot be read.
    pub async fn new(config: MarshalConfig) -> Result<Self, StoreError> {
        let blobs = BlobIndex::open(&config.data_dir).await?;
        Ok(Self {
            config,
            poses: PoseStore::new(),
            blobs,
            hub: WsHub::new(),
            started: Instant::now(),
        })
    }
}
