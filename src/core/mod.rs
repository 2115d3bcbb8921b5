//! Core business logic for the export service.
//!
//! This module contains the export pipeline and its serialization layer:
//!
//! - [`export`] - scope-keyed freshness cache, per-key generation locks,
//!   atomic publication, and the coordinating [`ExportService`](export::ExportService)
//! - [`format`] - CSV/XLSX/ZIP writers over a lazy record stream
//!
//! # Export Workflow
//!
//! 1. **Resolve**: classify the raw request into a scope, filenames and
//!    freshness threshold
//! 2. **Lookup**: check the canonical artifact and its in-flight marker
//! 3. **Lock** (on MISS): acquire the cache key's generation lock and
//!    re-check freshness
//! 4. **Generate**: stream records from the source through the format
//!    writer into the marker file
//! 5. **Publish**: atomically rename the marker onto the canonical path
//! 6. **Stream**: hand the published file back to the caller

pub mod export;
pub mod format;
