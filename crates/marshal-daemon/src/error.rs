//! Top-level error type for the daemon.

/// Errors that can end the daemon with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// The data directory could not be prepared.
    #[error("store error: {0}")]
    Store(#[from] marshal_store::StoreError),

    /// A server failed to bind or died while serving.
    #[error("server error: {0}")]
    Server(#[from] marshal_server::ServerError),
}
