//! Domain models and types for the export service.
//!
//! This module contains the core domain types and business rules:
//!
//! - **Scope resolution** ([`ExportScope`], [`ResolvedRequest`]) — classifying
//!   a raw request into a time window, cache filenames and freshness threshold
//! - **Records** ([`ExportRecord`], [`Cell`]) — the flattened measurement row
//!   and its typed column projection
//! - **Error types** ([`ExportError`]) and the [`Result`] alias
//!
//! Scope resolution is pure and infallible: malformed parameters always
//! degrade to the rolling current window rather than erroring.

pub mod errors;
pub mod record;
pub mod result;
pub mod scope;

// Re-export commonly used types for convenience
pub use errors::ExportError;
pub use record::{Cell, ExportRecord};
pub use result::Result;
pub use scope::{ExportRequest, ExportScope, OutputFormat, ResolvedRequest, ScopeFilenames};
