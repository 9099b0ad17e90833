//! In-process TTL cache for aggregate read models.
//!
//! Rankings, statistics, and user listings are cheap to serve from memory
//! and expensive to recompute, so reads go through this cache with short,
//! per-key TTLs. Every value is re-derivable from the record store, which
//! makes last-writer-wins under the internal mutex acceptable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{CacheKey, SnapshotCache};

/// Per-key time-to-live configuration.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    /// Lifetime of leaderboard snapshots.
    pub rankings: Duration,
    /// Lifetime of global statistics snapshots.
    pub stats: Duration,
    /// Lifetime of the full user listing.
    pub users: Duration,
}

impl CacheTtls {
    fn for_key(&self, key: CacheKey) -> Duration {
        match key {
            CacheKey::Rankings => self.rankings,
            CacheKey::Stats => self.stats,
            CacheKey::Users => self.users,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            rankings: Duration::seconds(30),
            stats: Duration::seconds(10),
            users: Duration::seconds(30),
        }
    }
}

struct Entry {
    value: serde_json::Value,
    captured_at: DateTime<Utc>,
}

/// Mutex-guarded snapshot cache with clock-driven expiry.
pub struct InMemorySnapshotCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    ttls: CacheTtls,
    clock: Arc<dyn Clock>,
}

impl InMemorySnapshotCache {
    /// Create a cache with the given TTLs and time source.
    pub fn new(ttls: CacheTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttls,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        // A poisoned mutex means a panic mid-insert; dropping the stale map
        // is safe because every snapshot is re-derivable.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                guard.clear();
                guard
            }
        }
    }
}

impl SnapshotCache for InMemorySnapshotCache {
    fn get(&self, key: CacheKey) -> Option<serde_json::Value> {
        let now = self.clock.utc();
        let mut entries = self.lock();
        match entries.get(&key) {
            Some(entry) if now - entry.captured_at < self.ttls.for_key(key) => {
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(?key, "cache snapshot expired");
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, value: serde_json::Value) {
        let captured_at = self.clock.utc();
        self.lock().insert(key, Entry { value, captured_at });
    }

    fn invalidate(&self, key: CacheKey) {
        self.lock().remove(&key);
    }

    fn invalidate_all(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{fixture_instant, MutableClock};
    use rstest::rstest;
    use serde_json::json;

    fn cache_with_clock() -> (InMemorySnapshotCache, Arc<MutableClock>) {
        let clock = Arc::new(MutableClock::starting_at(fixture_instant()));
        let cache = InMemorySnapshotCache::new(CacheTtls::default(), clock.clone());
        (cache, clock)
    }

    #[test]
    fn serves_snapshot_within_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put(CacheKey::Stats, json!({"totalGames": 3}));
        clock.advance(Duration::seconds(9));
        assert_eq!(cache.get(CacheKey::Stats), Some(json!({"totalGames": 3})));
    }

    #[rstest]
    #[case(CacheKey::Rankings, 30)]
    #[case(CacheKey::Stats, 10)]
    #[case(CacheKey::Users, 30)]
    fn expires_snapshot_at_its_ttl(#[case] key: CacheKey, #[case] ttl_secs: i64) {
        let (cache, clock) = cache_with_clock();
        cache.put(key, json!(1));
        clock.advance(Duration::seconds(ttl_secs - 1));
        assert!(cache.get(key).is_some(), "still live one second before TTL");
        clock.advance(Duration::seconds(1));
        assert!(cache.get(key).is_none(), "expired once TTL has elapsed");
    }

    #[test]
    fn keys_expire_independently() {
        let (cache, clock) = cache_with_clock();
        cache.put(CacheKey::Stats, json!("stats"));
        cache.put(CacheKey::Rankings, json!("rankings"));
        clock.advance(Duration::seconds(15));
        assert!(cache.get(CacheKey::Stats).is_none());
        assert_eq!(cache.get(CacheKey::Rankings), Some(json!("rankings")));
    }

    #[test]
    fn invalidate_drops_only_the_named_key() {
        let (cache, _clock) = cache_with_clock();
        cache.put(CacheKey::Stats, json!(1));
        cache.put(CacheKey::Users, json!(2));
        cache.invalidate(CacheKey::Stats);
        assert!(cache.get(CacheKey::Stats).is_none());
        assert!(cache.get(CacheKey::Users).is_some());
    }

    #[test]
    fn invalidate_all_clears_everything() {
        let (cache, _clock) = cache_with_clock();
        cache.put(CacheKey::Stats, json!(1));
        cache.put(CacheKey::Rankings, json!(2));
        cache.invalidate_all();
        assert!(cache.get(CacheKey::Stats).is_none());
        assert!(cache.get(CacheKey::Rankings).is_none());
    }

    #[test]
    fn rewriting_a_key_restarts_its_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put(CacheKey::Stats, json!("old"));
        clock.advance(Duration::seconds(8));
        cache.put(CacheKey::Stats, json!("new"));
        clock.advance(Duration::seconds(8));
        assert_eq!(cache.get(CacheKey::Stats), Some(json!("new")));
    }
}
