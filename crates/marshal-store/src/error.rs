//! Error types for the persistence layer.
//!
//! Filesystem failures carry the offending path and the underlying OS
//! error so handlers can surface a useful `what` field.

use std::path::PathBuf;

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An ingest was attempted with a zero-length payload.
    #[error("empty blob payload")]
    EmptyBlob,

    /// A file could not be created or opened for writing.
    #[error("open failed: {path}: {source}")]
    Open {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A write or flush to a file failed.
    #[error("write failed: {path}: {source}")]
    Write {
        /// The path being written.
        path: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// The temp-to-final rename of an atomic replacement failed.
    #[error("rename failed: {from} -> {to}: {source}")]
    Rename {
        /// The temporary sibling path.
        from: PathBuf,
        /// The destination path.
        to: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// Appending a line to the index log failed.
    #[error("index append failed: {path}: {source}")]
    Append {
        /// The index log path.
        path: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// A read from the data directory failed.
    #[error("read failed: {path}: {source}")]
    Read {
        /// The path being read.
        path: PathBuf,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// An index entry could not be encoded as JSON.
    #[error("index entry encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
