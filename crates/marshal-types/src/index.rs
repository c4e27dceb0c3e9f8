//! Blob index records.
//!
//! Every ingested blob produces one [`IndexEntry`]: a line appended to
//! `index.jsonl` and, verbatim, the new content of `latest.json`.

use serde::{Deserialize, Serialize};

/// Entry kind for acquisition payloads. Currently the only kind the
/// marshal writes.
pub const ENTRY_KIND_ACQ: &str = "acq";

/// One record of the append-only blob index.
///
/// Within one process lifetime `seq` values are strictly increasing and
/// unique, and `ts` values are non-decreasing; the file named by `path`
/// exists on disk at the moment the entry is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Absolute filesystem path of the stored blob.
    pub path: String,

    /// RFC 3339 UTC timestamp with millisecond precision, assigned at
    /// ingest. The padded format makes lexicographic and temporal order
    /// coincide.
    pub ts: String,

    /// Observed size of the stored blob.
    pub size_bytes: u64,

    /// Entry kind tag (see [`ENTRY_KIND_ACQ`]).
    #[serde(rename = "type")]
    pub kind: String,

    /// Per-process monotonic sequence number, starting at 1.
    pub seq: u64,
}
