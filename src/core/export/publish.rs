//! Atomic artifact publication
//!
//! A generation writes into the marker path and publishes by renaming it
//! onto the canonical path. The rename is the sole publish point: readers
//! see either the previous complete artifact or the new complete one,
//! never a torn file. A failed generation abandons the marker file and
//! leaves the canonical artifact untouched.

use crate::domain::{ExportError, Result};
use std::path::Path;
use tokio::fs::File;

/// Publish a finished marker file onto the canonical path
///
/// Relies on the filesystem's rename atomicity; both paths must live in
/// the same directory.
pub async fn publish(marker: &Path, canonical: &Path) -> Result<()> {
    tokio::fs::rename(marker, canonical).await.map_err(|e| {
        ExportError::Io(format!(
            "Failed to publish {}: {}",
            canonical.display(),
            e
        ))
    })
}

/// Open a published artifact for streaming to the caller
///
/// Returns the open file together with its length.
pub async fn open_published(canonical: &Path) -> Result<(File, u64)> {
    let file = File::open(canonical).await.map_err(|e| {
        ExportError::Io(format!(
            "Failed to open published artifact {}: {}",
            canonical.display(),
            e
        ))
    })?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ExportError::Io(format!("Failed to stat published artifact: {}", e)))?
        .len();
    Ok((file, len))
}
