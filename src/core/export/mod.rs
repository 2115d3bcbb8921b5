//! Export orchestration: freshness cache, generation locks, atomic
//! publication, and the coordinating service.

pub mod cache;
pub mod locks;
pub mod publish;
pub mod service;

pub use cache::{CacheDecision, FreshnessCache, MARKER_SUFFIX};
pub use locks::GenerationLocks;
pub use service::{ExportReply, ExportService};
