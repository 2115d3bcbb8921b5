//! Record source abstraction
//!
//! This module defines the trait that record sources must implement to feed
//! the export pipeline.

use crate::domain::record::ExportRecord;
use crate::domain::scope::ExportScope;
use crate::domain::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Ordered, lazy, forward-only sequence of export records
///
/// Records are produced one at a time so peak memory stays bounded
/// regardless of export size. The stream is not restartable.
pub type RecordStream = BoxStream<'static, Result<ExportRecord>>;

/// Source of export records for a given scope
///
/// Implementations must return records in a stable order, restricted to the
/// scope's time window, excluding soft-deleted and unfinished entries, with
/// the geolocation coarsening policy already applied.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the ordered record sequence for a scope
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be started. Row-level failures
    /// surface as `Err` items on the returned stream.
    async fn fetch(&self, scope: &ExportScope) -> Result<RecordStream>;
}
