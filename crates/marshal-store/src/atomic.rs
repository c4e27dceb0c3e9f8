//! Crash-consistent file replacement.
//!
//! [`write_atomic`] writes the new content to a sibling `<dst>.tmp`,
//! flushes it to stable storage, then renames it over the destination.
//! A reader of `dst` therefore observes either the old content or the
//! new content in full, never a partial write, under the rename/fsync
//! guarantees of the underlying filesystem.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// Atomically replace `dst` with `bytes`.
///
/// The temporary sibling is not cleaned up on failure; the next attempt
/// truncates it.
///
/// # Errors
///
/// Returns [`StoreError::Open`], [`StoreError::Write`], or
/// [`StoreError::Rename`] naming the stage that failed and the path
/// involved.
pub async fn write_atomic(dst: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = tmp_sibling(dst);

    let mut file = fs::File::create(&tmp).await.map_err(|source| StoreError::Open {
        path: tmp.clone(),
        source,
    })?;
    file.write_all(bytes).await.map_err(|source| StoreError::Write {
        path: tmp.clone(),
        source,
    })?;
    file.sync_all().await.map_err(|source| StoreError::Write {
        path: tmp.clone(),
        source,
    })?;
    drop(file);

    fs::rename(&tmp, dst).await.map_err(|source| StoreError::Rename {
        from: tmp,
        to: dst.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// `<dst>.tmp`, appended to the full filename so `a.mrd` pairs with
/// `a.mrd.tmp` rather than replacing the extension.
fn tmp_sibling(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
