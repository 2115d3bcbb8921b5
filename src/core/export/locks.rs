//! Per-cache-key generation locks
//!
//! At most one in-process generation runs per cache key: a MISS acquires
//! the key's async mutex and re-checks freshness before generating, so
//! concurrent requests for the same artifact wait for the first generation
//! instead of duplicating it. Requests for different keys proceed
//! independently. Cross-process duplication is still possible and is
//! tolerated by design; the filesystem marker heuristic covers that case.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Registry of per-key async mutexes
#[derive(Debug, Default)]
pub struct GenerationLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl GenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a cache key
    ///
    /// Repeated calls with the same key return the same mutex; the handle
    /// is cloned out so the registry lock is held only briefly.
    pub fn for_key(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().expect("generation lock registry poisoned");
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_returns_same_mutex() {
        let locks = GenerationLocks::new();
        let first = locks.for_key("netztest-opendata.zip");
        let second = locks.for_key("netztest-opendata.zip");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let locks = GenerationLocks::new();
        let first = locks.for_key("netztest-opendata.zip");
        let second = locks.for_key("netztest-opendata.xlsx");
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_lock_serializes_critical_sections() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let locks = Arc::new(GenerationLocks::new());
        let concurrent = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let concurrent = concurrent.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let lock = locks.for_key("same-key");
                let _guard = lock.lock().await;
                let active = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(active, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
