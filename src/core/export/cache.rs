//! Freshness cache
//!
//! Decides HIT or MISS for a resolved artifact by inspecting the canonical
//! file and its in-flight marker on the filesystem. The check is a
//! best-effort, non-blocking heuristic: it never locks, never waits, and
//! tolerates false negatives across processes. Mutual exclusion within the
//! process is handled separately by the generation locks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Suffix appended to the canonical filename while a generation is in flight
pub const MARKER_SUFFIX: &str = "_tmp";

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Serve the canonical artifact at this path
    Hit(PathBuf),
    /// Generate a fresh artifact
    Miss,
}

/// Filesystem-backed freshness cache over a single scratch directory
#[derive(Debug, Clone)]
pub struct FreshnessCache {
    dir: PathBuf,
}

impl FreshnessCache {
    /// Create a cache rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory root
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical path of a published artifact
    pub fn canonical_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Path of the in-flight marker for an artifact
    pub fn marker_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{filename}{MARKER_SUFFIX}"))
    }

    /// Decide HIT or MISS for an artifact
    ///
    /// A HIT requires the canonical artifact to exist and either the
    /// artifact itself or its marker to be younger than `threshold` at
    /// `now`. A fresh marker alone is never a HIT: there would be nothing
    /// complete to serve. Age exactly equal to the threshold is a MISS.
    pub fn lookup(&self, filename: &str, threshold: Duration, now: SystemTime) -> CacheDecision {
        let canonical = self.canonical_path(filename);
        if !canonical.exists() {
            return CacheDecision::Miss;
        }

        if is_fresh(&canonical, threshold, now) || is_fresh(&self.marker_path(filename), threshold, now)
        {
            CacheDecision::Hit(canonical)
        } else {
            CacheDecision::Miss
        }
    }
}

fn is_fresh(path: &Path, threshold: Duration, now: SystemTime) -> bool {
    match fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(mtime) => match now.duration_since(mtime) {
            Ok(age) => age < threshold,
            // mtime in the future counts as just-written
            Err(_) => true,
        },
        Err(_) => false,
    }
}
