//! In-process request counters served by `/metrics`

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Default)]
struct RouteStats {
    count: u64,
    errors: u64,
    total_ms: u128,
}

#[derive(Clone)]
pub struct MetricsCollector {
    total_requests: Arc<AtomicU64>,
    successful_requests: Arc<AtomicU64>,
    failed_requests: Arc<AtomicU64>,
    requests_by_method: Arc<RwLock<HashMap<String, u64>>>,
    requests_by_route: Arc<RwLock<HashMap<String, RouteStats>>>,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub requests_by_method: HashMap<String, u64>,
    pub requests_by_route: Vec<RouteMetric>,
    pub uptime_seconds: i64,
    pub error_rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteMetric {
    pub route: String,
    pub count: u64,
    pub errors: u64,
    pub average_response_time_ms: f64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicU64::new(0)),
            successful_requests: Arc::new(AtomicU64::new(0)),
            failed_requests: Arc::new(AtomicU64::new(0)),
            requests_by_method: Arc::new(RwLock::new(HashMap::new())),
            requests_by_route: Arc::new(RwLock::new(HashMap::new())),
            start_time: Utc::now(),
        }
    }

    /// `route` should be the matched route template so identifiers in paths
    /// do not create one entry per resource.
    pub fn record(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let failed = status >= 400;
        if failed {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        }

        *self
            .requests_by_method
            .write()
            .entry(method.to_string())
            .or_insert(0) += 1;

        let mut routes = self.requests_by_route.write();
        let stats = routes.entry(route.to_string()).or_default();
        stats.count += 1;
        stats.total_ms += elapsed.as_millis();
        if failed {
            stats.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);

        let uptime_seconds = Utc::now()
            .signed_duration_since(self.start_time)
            .num_seconds();

        let mut routes: Vec<RouteMetric> = self
            .requests_by_route
            .read()
            .iter()
            .map(|(route, stats)| RouteMetric {
                route: route.clone(),
                count: stats.count,
                errors: stats.errors,
                average_response_time_ms: if stats.count > 0 {
                    stats.total_ms as f64 / stats.count as f64
                } else {
                    0.0
                },
            })
            .collect();
        routes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.route.cmp(&b.route)));

        MetricsSnapshot {
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            requests_by_method: self.requests_by_method.read().clone(),
            requests_by_route: routes,
            uptime_seconds,
            error_rate: if total > 0 {
                (failed as f64 / total as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
