//! Persistence layer for the acquisition data marshal.
//!
//! Three pieces, leaves first:
//!
//! - [`atomic::write_atomic`] -- crash-consistent replacement of a file
//!   (write a sibling temp, fsync, rename).
//! - [`PoseStore`] -- thread-safe single-slot holder for the most recent
//!   [`Pose`](marshal_types::Pose).
//! - [`BlobIndex`] -- owns the on-disk blob directory, the append-only
//!   `index.jsonl` log, and the atomically replaced `latest.json`
//!   pointer; assigns monotonic sequence numbers.
//!
//! The blob index performs real filesystem I/O through [`tokio::fs`];
//! the pose store is purely in-memory.

pub mod atomic;
pub mod blob_index;
pub mod error;
pub mod pose_store;

pub use atomic::write_atomic;
pub use blob_index::BlobIndex;
pub use error::StoreError;
pub use pose_store::PoseStore;
