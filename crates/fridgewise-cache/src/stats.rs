//! Process-wide cache statistics.
//!
//! One [`CacheStats`] is created with the [`ResponseCache`](crate::ResponseCache)
//! and lives as long as the process. Counters only ever increase.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    total_requests: AtomicU64,
}

/// Point-in-time copy of the counters, serialized into `X-Cache-Stats`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// `hits / totalRequests`, or 0 before any request.
    pub hit_rate: f64,
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a failed background write or invalidation.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let total_requests = self.total_requests.load(Ordering::Relaxed);

        let hit_rate = if total_requests == 0 {
            0.0
        } else {
            hits as f64 / total_requests as f64
        };

        StatsSnapshot {
            hit_rate,
            total_requests,
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Compact JSON form used in response headers.
    pub fn to_header_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_hit_rate_is_zero() {
        let snapshot = CacheStats::new().snapshot();
        assert_eq!(snapshot.hit_rate, 0.0);
        assert_eq!(snapshot.total_requests, 0);
    }

    #[test]
    fn test_hit_rate_ratio() {
        let stats = CacheStats::new();
        for _ in 0..4 {
            stats.record_request();
        }
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_error();

        let snapshot = stats.snapshot();
        assert!((snapshot.hit_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 2);
        assert_eq!(snapshot.errors, 1);
    }

    #[test]
    fn test_header_json_shape() {
        let stats = CacheStats::new();
        stats.record_request();
        stats.record_hit();

        let json: serde_json::Value =
            serde_json::from_str(&stats.snapshot().to_header_json()).unwrap();
        assert_eq!(json["hitRate"], 1.0);
        assert_eq!(json["totalRequests"], 1);
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 0);
        assert_eq!(json["errors"], 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        let stats = Arc::new(CacheStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                tokio::spawn(async move {
                    for _ in 0..1000 {
                        stats.record_request();
                        stats.record_miss();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 8000);
        assert_eq!(snapshot.misses, 8000);
    }
}
