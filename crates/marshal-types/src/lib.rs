//! Shared data model for the acquisition data marshal.
//!
//! This crate holds the types that cross component boundaries:
//!
//! - [`Pose`] -- a rigid-body transform (position + rotation matrix) with
//!   frame and source metadata, as produced by the tracking pipeline and
//!   served over the HTTP API.
//! - [`IndexEntry`] -- one line of the append-only blob index
//!   (`index.jsonl`) and the payload of the `latest.json` pointer.
//! - RFC 3339 time formatting helpers shared by the index, the blob
//!   filenames, and the pose endpoints.
//!
//! Everything here is plain data: `serde` in, `serde` out, no I/O.

pub mod index;
pub mod pose;
pub mod time;

pub use index::{ENTRY_KIND_ACQ, IndexEntry};
pub use pose::Pose;
pub use time::{format_iso8601_ms, iso8601_now, iso8601_now_ms};
