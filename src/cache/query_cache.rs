//! Query result cache
//!
//! Keeps executed result sets under a generated `query_id` so a caller can
//! fetch the full data again (export, full table view) after the answer has
//! been delivered.

use super::clock::{Clock, SystemClock};
use super::ttl::TtlCache;
use crate::execution::ResultSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;
use uuid::Uuid;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize)]
pub struct CachedQuery {
    pub query_id: String,
    pub question: String,
    pub sql_query: String,
    pub data: ResultSet,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_queries: usize,
    pub ttl_seconds: u64,
}

pub struct QueryCache {
    entries: TtlCache<String, Arc<CachedQuery>>,
    last_sweep: Mutex<Instant>,
    /// Wall-clock time matching `started`; timestamps are offsets from it
    /// so they agree with the expiry clock.
    started: Instant,
    started_at: DateTime<Utc>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let started = clock.now();
        Self {
            entries: TtlCache::with_clock(ttl, clock),
            last_sweep: Mutex::new(started),
            started,
            started_at: Utc::now(),
        }
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let elapsed = self.entries.clock().now().saturating_duration_since(self.started);
        self.started_at + chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero())
    }

    /// Store a result set and return its new `query_id`.
    pub fn store(
        &self,
        data: ResultSet,
        question: &str,
        sql_query: &str,
        metadata: Option<serde_json::Value>,
    ) -> String {
        let query_id = Uuid::new_v4().to_string();
        let created_at = self.wall_now();
        let expires_at = created_at
            + chrono::Duration::from_std(self.entries.ttl()).unwrap_or_else(|_| chrono::Duration::hours(1));
        let row_count = data.row_count();

        self.entries.put(
            query_id.clone(),
            Arc::new(CachedQuery {
                query_id: query_id.clone(),
                question: question.to_string(),
                sql_query: sql_query.to_string(),
                data,
                metadata: metadata.unwrap_or_else(|| serde_json::json!({})),
                created_at,
                expires_at,
                row_count,
            }),
        );

        info!(query_id = %query_id, row_count, expires_at = %expires_at, "Query cached");
        self.sweep_if_due();
        query_id
    }

    pub fn get(&self, query_id: &str) -> Option<Arc<CachedQuery>> {
        let entry = self.entries.get(&query_id.to_string());
        if entry.is_none() {
            tracing::debug!(query_id, "Query not cached or expired");
        }
        entry
    }

    pub fn delete(&self, query_id: &str) -> bool {
        let removed = self.entries.evict(&query_id.to_string());
        if removed {
            info!(query_id, "Query manually deleted");
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.evict_expired();
        CacheStats {
            total_queries: self.entries.len(),
            ttl_seconds: self.entries.ttl().as_secs(),
        }
    }

    fn sweep_if_due(&self) {
        let now = self.entries.clock().now();
        let mut last = self.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
        if now.duration_since(*last) < SWEEP_INTERVAL {
            return;
        }
        *last = now;
        drop(last);

        let removed = self.entries.evict_expired();
        if removed > 0 {
            info!(removed, "Cleaned up expired queries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::result_set;

    fn rows() -> ResultSet {
        result_set!(["name", "count"], ["Action", 64], ["Drama", 62]).unwrap()
    }

    #[test]
    fn test_store_and_get() {
        let cache = QueryCache::new(Duration::from_secs(3600));
        let id = cache.store(rows(), "films per category", "SELECT 1 LIMIT 1", None);

        let cached = cache.get(&id).expect("cached");
        assert_eq!(cached.row_count, 2);
        assert_eq!(cached.question, "films per category");
        assert_eq!(cached.metadata, serde_json::json!({}));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_expired_entry_is_gone() {
        let clock = ManualClock::new();
        let cache = QueryCache::with_clock(Duration::from_secs(3600), Arc::new(clock.clone()));
        let id = cache.store(rows(), "q", "SELECT 1 LIMIT 1", None);

        clock.advance(Duration::from_secs(3601));
        assert!(cache.get(&id).is_none());
        assert_eq!(cache.stats().total_queries, 0);
    }

    #[test]
    fn test_timestamps_follow_cache_clock() {
        let clock = ManualClock::new();
        let cache = QueryCache::with_clock(Duration::from_secs(600), Arc::new(clock.clone()));
        let first = cache.get(&cache.store(rows(), "a", "SELECT 1 LIMIT 1", None)).unwrap();

        clock.advance(Duration::from_secs(120));
        let second = cache.get(&cache.store(rows(), "b", "SELECT 1 LIMIT 1", None)).unwrap();

        assert_eq!(second.created_at - first.created_at, chrono::Duration::seconds(120));
        assert_eq!(first.expires_at - first.created_at, chrono::Duration::seconds(600));

        // Gone exactly when the reported expiry has passed.
        clock.advance(Duration::from_secs(481));
        assert!(cache.get(&first.query_id).is_none());
        assert!(cache.get(&second.query_id).is_some());
    }

    #[test]
    fn test_periodic_sweep_on_store() {
        let clock = ManualClock::new();
        let cache = QueryCache::with_clock(Duration::from_secs(60), Arc::new(clock.clone()));
        cache.store(rows(), "old", "SELECT 1 LIMIT 1", None);

        clock.advance(SWEEP_INTERVAL);
        cache.store(rows(), "new", "SELECT 1 LIMIT 1", None);
        assert_eq!(cache.entries.len(), 1);
    }

    #[test]
    fn test_delete() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let id = cache.store(rows(), "q", "SELECT 1 LIMIT 1", None);
        assert!(cache.delete(&id));
        assert!(!cache.delete(&id));
        assert_eq!(
            cache.stats(),
            CacheStats {
                total_queries: 0,
                ttl_seconds: 60
            }
        );
    }
}
