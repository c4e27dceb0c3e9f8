//! Durable blob archival with a queryable append-only index.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/mrd/
//!   <ISO8601_ms>_<seq:6>.mrd     one file per ingest
//!   index.jsonl                  append-only log, one JSON object per line
//!   latest.json                  atomically replaced pointer
//! ```
//!
//! A single async mutex serializes the whole ingest region -- sequence
//! assignment, blob write, index append, and latest-pointer replacement
//! -- so concurrent ingests observe strictly ordered sequence numbers
//! and no partial index lines ever interleave.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use marshal_types::{ENTRY_KIND_ACQ, IndexEntry, iso8601_now_ms};

use crate::atomic::write_atomic;
use crate::error::StoreError;

/// Name of the append-only index log inside the blob directory.
const INDEX_FILE: &str = "index.jsonl";

/// Name of the latest-pointer file inside the blob directory.
const LATEST_FILE: &str = "latest.json";

/// Owner of the on-disk blob directory, index log, and latest pointer.
pub struct BlobIndex {
    mrd_dir: PathBuf,
    state: Mutex<IngestState>,
}

/// State protected by the ingest mutex.
#[derive(Debug)]
struct IngestState {
    /// Sequence number the next successful ingest will receive.
    next_seq: u64,
}

impl BlobIndex {
    /// Open (creating if necessary) the blob directory under `data_dir`.
    ///
    /// The sequence counter is seeded from the last parseable line of an
    /// existing `index.jsonl`, so a restarted marshal continues the
    /// sequence instead of reusing numbers; a fresh directory starts at 1.
    /// The directory is canonicalized so every index entry records an
    /// absolute blob path.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the directory cannot be created or the
    /// existing index cannot be read.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let mrd_dir = data_dir.join("mrd");
        fs::create_dir_all(&mrd_dir)
            .await
            .map_err(|source| StoreError::Open {
                path: mrd_dir.clone(),
                source,
            })?;
        let mrd_dir = fs::canonicalize(&mrd_dir)
            .await
            .map_err(|source| StoreError::Read {
                path: mrd_dir.clone(),
                source,
            })?;

        let last_seq = last_recorded_seq(&mrd_dir.join(INDEX_FILE)).await?;
        if last_seq > 0 {
            tracing::info!(last_seq, dir = %mrd_dir.display(), "resuming blob index");
        }

        Ok(Self {
            mrd_dir,
            state: Mutex::new(IngestState {
                next_seq: last_seq + 1,
            }),
        })
    }

    /// Archive one opaque blob.
    ///
    /// Assigns a timestamp and the next sequence number, writes the blob
    /// atomically, appends its [`IndexEntry`] to `index.jsonl`, replaces
    /// `latest.json` with the same entry, and returns it. The HTTP
    /// response for an ingest is only written after this returns, so the
    /// entry is durable before the caller sees it.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmptyBlob`] for a zero-length payload; otherwise the
    /// filesystem error of whichever stage failed. A failure after the
    /// blob write but before the index append leaves an orphan blob on
    /// disk; the sequence number is not consumed, so the index itself
    /// stays gap-free.
    pub async fn ingest(&self, bytes: &[u8]) -> Result<IndexEntry, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::EmptyBlob);
        }

        let mut state = self.state.lock().await;

        // Timestamp taken inside the lock: file order, seq order, and ts
        // order all agree.
        let ts = iso8601_now_ms();
        let seq = state.next_seq;
        let blob_path = self.mrd_dir.join(format!("{ts}_{seq:06}.mrd"));

        write_atomic(&blob_path, bytes).await?;

        let size_bytes = match fs::metadata(&blob_path).await {
            Ok(meta) => meta.len(),
            Err(_) => bytes.len() as u64,
        };

        let entry = IndexEntry {
            path: blob_path.display().to_string(),
            ts,
            size_bytes,
            kind: String::from(ENTRY_KIND_ACQ),
            seq,
        };
        let line = serde_json::to_string(&entry)?;

        append_line(&self.index_path(), &line).await?;
        write_atomic(&self.latest_path(), line.as_bytes()).await?;

        state.next_seq += 1;
        tracing::debug!(seq, size_bytes, path = %entry.path, "blob ingested");

        Ok(entry)
    }

    /// Raw bytes of `latest.json`, or `None` when the pointer is absent
    /// or empty. The content is not validated as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] for any failure other than the file
    /// not existing.
    pub async fn latest(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.latest_path();
        match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Entries with `ts` strictly greater than `after_ts`, in file order.
    ///
    /// Streams `index.jsonl` top to bottom, skipping malformed lines.
    /// Stops after `limit` entries when `limit > 0`. The padded RFC 3339
    /// format makes the lexicographic comparison a temporal one. A
    /// missing index yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the index exists but cannot be
    /// read.
    pub async fn since(&self, after_ts: &str, limit: usize) -> Result<Vec<IndexEntry>, StoreError> {
        let path = self.index_path();
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let mut lines = BufReader::new(file).lines();
        let mut out = Vec::new();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?
        {
            if line.is_empty() {
                continue;
            }
            let Ok(entry) = serde_json::from_str::<IndexEntry>(&line) else {
                continue;
            };
            if entry.ts.as_str() > after_ts {
                out.push(entry);
                if limit > 0 && out.len() >= limit {
                    break;
                }
            }
        }

        Ok(out)
    }

    /// The blob directory this index writes into.
    pub fn dir(&self) -> &Path {
        &self.mrd_dir
    }

    fn index_path(&self) -> PathBuf {
        self.mrd_dir.join(INDEX_FILE)
    }

    fn latest_path(&self) -> PathBuf {
        self.mrd_dir.join(LATEST_FILE)
    }
}

/// Append one line plus newline to the index log, creating it if needed.
async fn append_line(path: &Path, line: &str) -> Result<(), StoreError> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
        .map_err(|source| StoreError::Append {
            path: path.to_path_buf(),
            source,
        })?;

    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');
    file.write_all(&buf)
        .await
        .map_err(|source| StoreError::Append {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}

/// Sequence number recorded on the last parseable line of the index, or
/// 0 when the index is missing or holds no parseable entries.
async fn last_recorded_seq(path: &Path) -> Result<u64, StoreError> {
    let file = match fs::File::open(path).await {
        Ok(file) => file,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut lines = BufReader::new(file).lines();
    let mut last = 0;
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?
    {
        if let Ok(entry) = serde_json::from_str::<IndexEntry>(&line) {
            last = entry.seq;
        }
    }

    Ok(last)
}
