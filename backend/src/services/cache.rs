//! In-memory TTL cache for report query results
//!
//! Owned by the reporting engine; every stock-mutating service clears it
//! after a successful commit. Entries may be up to TTL stale otherwise.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

/// Time source for the cache; swapped out in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

/// TTL cache keyed by the full report parameter tuple
pub struct ReportCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Box<dyn Clock>,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Fetch a cached result; expired entries are dropped on access
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                Some(entry.data.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, data: Value) {
        let stored_at = self.clock.now();
        self.lock_entries()
            .insert(key.to_string(), CacheEntry { data, stored_at });
    }

    /// Drop everything. Called after every successful ledger mutation so the
    /// next report read recomputes fresh numbers.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Drop expired entries; driven by the periodic sweep task
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.lock_entries()
            .retain(|_, entry| now.duration_since(entry.stored_at) <= self.ttl);
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock that only moves when told to
    struct ManualClock {
        base: Instant,
        offset_ms: AtomicU64,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset_ms: AtomicU64::new(0),
            }
        }

        fn advance(&self, delta: Duration) {
            self.offset_ms
                .fetch_add(delta.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for &'static ManualClock {
        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    fn leaked_clock() -> &'static ManualClock {
        Box::leak(Box::new(ManualClock::new()))
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = leaked_clock();
        let cache = ReportCache::with_clock(Duration::from_secs(30), Box::new(clock));

        cache.set("summary:0:1", json!({"revenue": 100}));
        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get("summary:0:1"), Some(json!({"revenue": 100})));
    }

    #[test]
    fn test_expiry_after_ttl() {
        let clock = leaked_clock();
        let cache = ReportCache::with_clock(Duration::from_secs(30), Box::new(clock));

        cache.set("summary:0:1", json!({"revenue": 100}));
        clock.advance(Duration::from_secs(31));
        assert_eq!(cache.get("summary:0:1"), None);
        // Expired entry was dropped on access
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let clock = leaked_clock();
        let cache = ReportCache::with_clock(Duration::from_secs(30), Box::new(clock));

        cache.set("summary:0:1", json!(1));
        cache.set("top_products:7:10", json!(2));
        cache.clear();
        assert_eq!(cache.get("summary:0:1"), None);
        assert_eq!(cache.get("top_products:7:10"), None);
    }

    #[test]
    fn test_purge_only_drops_expired() {
        let clock = leaked_clock();
        let cache = ReportCache::with_clock(Duration::from_secs(30), Box::new(clock));

        cache.set("old", json!(1));
        clock.advance(Duration::from_secs(20));
        cache.set("fresh", json!(2));
        clock.advance(Duration::from_secs(15));

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(json!(2)));
    }

    #[test]
    fn test_set_overwrites_and_refreshes() {
        let clock = leaked_clock();
        let cache = ReportCache::with_clock(Duration::from_secs(30), Box::new(clock));

        cache.set("low_stock:20", json!([1]));
        clock.advance(Duration::from_secs(25));
        cache.set("low_stock:20", json!([2]));
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get("low_stock:20"), Some(json!([2])));
    }
}
