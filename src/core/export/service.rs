//! Export service - main orchestrator for the export pipeline
//!
//! Ties the pieces together: resolve the request into a scope, consult the
//! freshness cache, and on a MISS run one generation under the key's lock,
//! publishing the result atomically before streaming it back.

use crate::adapters::traits::RecordSource;
use crate::core::export::cache::{CacheDecision, FreshnessCache};
use crate::core::export::locks::GenerationLocks;
use crate::core::export::publish;
use crate::core::format::{write_csv, write_xlsx, write_zipped_csv};
use crate::domain::scope::{ExportRequest, OutputFormat, ResolvedRequest};
use crate::domain::{ExportError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// A served export artifact
///
/// The file handle is positioned at the start of the published canonical
/// artifact; callers stream it out however their transport requires.
#[derive(Debug)]
pub struct ExportReply {
    /// Open handle on the published artifact
    pub file: tokio::fs::File,
    /// Artifact size in bytes
    pub content_length: u64,
    /// MIME type matching the encoding
    pub content_type: &'static str,
    /// Attachment filename for spreadsheet/archive responses, `None` for
    /// bare delimited text
    pub attachment_filename: Option<String>,
}

/// Cached export service
pub struct ExportService {
    source: Arc<dyn RecordSource>,
    cache: FreshnessCache,
    locks: GenerationLocks,
    zip_csv: bool,
}

impl ExportService {
    /// Create an export service over a record source
    ///
    /// `cache_dir` is created if it does not exist. `zip_csv` is the
    /// system-wide policy of wrapping CSV artifacts in a zip archive.
    pub fn new(
        source: Arc<dyn RecordSource>,
        cache_dir: impl Into<PathBuf>,
        zip_csv: bool,
    ) -> Result<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            ExportError::Configuration(format!(
                "Failed to create cache directory {}: {}",
                cache_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            source,
            cache: FreshnessCache::new(cache_dir),
            locks: GenerationLocks::new(),
            zip_csv,
        })
    }

    /// Serve one export request
    ///
    /// Resolution never fails; malformed parameters degrade to the current
    /// scope. A fresh cached artifact is served directly. Otherwise one
    /// generation runs under the cache key's lock; concurrent requests for
    /// the same key wait and are then served the freshly published file.
    ///
    /// # Errors
    ///
    /// Returns an error if the record source or an I/O step fails. The
    /// previous canonical artifact, if any, is left untouched in that case
    /// but is not served as a fallback.
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportReply> {
        let resolved = ResolvedRequest::resolve(request, self.zip_csv);
        let filename = resolved.artifact_filename().to_string();

        tracing::debug!(
            scope = ?resolved.scope,
            artifact = %filename,
            "Resolved export request"
        );

        if let CacheDecision::Hit(path) =
            self.cache
                .lookup(&filename, resolved.threshold, SystemTime::now())
        {
            tracing::debug!(artifact = %filename, "Serving cached artifact");
            return self.reply(&path, &resolved).await;
        }

        let lock = self.locks.for_key(&filename);
        let _guard = lock.lock().await;

        // another request may have published while we waited for the lock
        if let CacheDecision::Hit(path) =
            self.cache
                .lookup(&filename, resolved.threshold, SystemTime::now())
        {
            tracing::debug!(artifact = %filename, "Serving artifact published while waiting");
            return self.reply(&path, &resolved).await;
        }

        self.generate(&resolved).await
    }

    async fn generate(&self, resolved: &ResolvedRequest) -> Result<ExportReply> {
        let filename = resolved.artifact_filename();
        let canonical = self.cache.canonical_path(filename);
        let marker = self.cache.marker_path(filename);
        let started = Instant::now();

        let mut records = self.source.fetch(&resolved.scope).await?;

        // the marker file doubles as the in-flight signal for other processes
        let sink = std::fs::File::create(&marker)?;
        let write_result = match resolved.format {
            OutputFormat::Xlsx => write_xlsx(&mut records, sink).await,
            OutputFormat::Csv if resolved.zip_wrapped => {
                write_zipped_csv(&mut records, sink, &resolved.filenames.csv).await
            }
            OutputFormat::Csv => write_csv(&mut records, sink).await,
        };

        let rows = match write_result {
            Ok(rows) => rows,
            Err(e) => {
                // abandon the marker; the previous canonical artifact stays valid
                tracing::error!(
                    artifact = %filename,
                    error = %e,
                    "Export generation failed"
                );
                return Err(e);
            }
        };

        publish::publish(&marker, &canonical).await?;

        tracing::info!(
            artifact = %filename,
            rows,
            duration_ms = started.elapsed().as_millis() as u64,
            "Export generated and published"
        );

        self.reply(&canonical, resolved).await
    }

    async fn reply(&self, path: &Path, resolved: &ResolvedRequest) -> Result<ExportReply> {
        let (file, content_length) = publish::open_published(path).await?;
        Ok(ExportReply {
            file,
            content_length,
            content_type: resolved.content_type(),
            attachment_filename: resolved.attachment_filename().map(String::from),
        })
    }
}
