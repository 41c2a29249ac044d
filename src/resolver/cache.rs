//! Short-TTL memoization of full resolution passes.
//!
//! Bursts of near-simultaneous callers (store-change notifications, rapid
//! re-renders) should not each pay for the O(V+E) graph work. The cache is
//! an explicit object owned by the caller, not a process-wide singleton, so
//! tests and concurrent callers never share hidden state. Entries are keyed
//! by (tag, include-completed flag, coarse time bucket) and expire strictly
//! by elapsed wall-clock time; a caller that just wrote through the store
//! calls [`EvalCache::invalidate`] instead of waiting out the TTL.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::ResolverOptions;
use crate::models::EligibilityResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tag: String,
    include_completed: bool,
    bucket: i64,
}

struct CacheEntry {
    stored_at: Instant,
    results: Vec<EligibilityResult>,
}

/// Caller-owned memoization of eligibility passes.
pub struct EvalCache {
    ttl: Duration,
    bucket_ms: i64,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl EvalCache {
    pub fn new(options: &ResolverOptions) -> Self {
        Self {
            ttl: Duration::from_millis(options.cache_ttl_ms),
            bucket_ms: options.cache_bucket_ms.max(1) as i64,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, tag: &str, include_completed: bool, now: DateTime<Utc>) -> CacheKey {
        CacheKey {
            tag: tag.to_string(),
            include_completed,
            bucket: now.timestamp_millis() / self.bucket_ms,
        }
    }

    /// Fetch a live entry, if one exists for this key.
    pub fn get(
        &self,
        tag: &str,
        include_completed: bool,
        now: DateTime<Utc>,
    ) -> Option<Vec<EligibilityResult>> {
        let key = self.key(tag, include_completed, now);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                tracing::debug!(tag, bucket = key.bucket, "eligibility cache hit");
                Some(entry.results.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store a pass result.
    pub fn put(
        &self,
        tag: &str,
        include_completed: bool,
        now: DateTime<Utc>,
        results: Vec<EligibilityResult>,
    ) {
        let key = self.key(tag, include_completed, now);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        // Drop anything already expired while we hold the lock.
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                results,
            },
        );
    }

    /// Drop every entry, typically right after a known write.
    pub fn invalidate(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }
}
