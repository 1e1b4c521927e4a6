//! Request counters and a latency histogram, rendered in Prometheus text
//! exposition format
//!
//! Plain atomics; safe under axum's per-request concurrency without locks.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Upper bounds (seconds) of the predict-latency histogram buckets
const LATENCY_BUCKETS: [f64; 6] = [0.001, 0.005, 0.01, 0.05, 0.1, 0.5];

/// Metrics registry for the serving façade
#[derive(Debug, Default)]
pub struct Metrics {
    health_requests: AtomicU64,
    predict_requests: AtomicU64,
    /// Cumulative counts per latency bucket, plus the +Inf bucket last
    latency_buckets: [AtomicU64; LATENCY_BUCKETS.len() + 1],
    /// Total observed latency in nanoseconds
    latency_sum_nanos: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one `/health` request
    pub fn record_health(&self) {
        self.health_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one `/predict` request and observe its latency
    pub fn record_predict(&self, latency: Duration) {
        self.predict_requests.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_nanos
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);

        let secs = latency.as_secs_f64();
        let bucket = LATENCY_BUCKETS
            .iter()
            .position(|&bound| secs <= bound)
            .unwrap_or(LATENCY_BUCKETS.len());
        self.latency_buckets[bucket].fetch_add(1, Ordering::Relaxed);
    }

    /// Number of predict requests observed so far
    #[must_use]
    pub fn predict_count(&self) -> u64 {
        self.predict_requests.load(Ordering::Relaxed)
    }

    /// Render all metrics in Prometheus text exposition format
    #[must_use]
    pub fn render(&self) -> String {
        let health = self.health_requests.load(Ordering::Relaxed);
        let predict = self.predict_requests.load(Ordering::Relaxed);
        let sum_secs =
            self.latency_sum_nanos.load(Ordering::Relaxed) as f64 / 1_000_000_000.0;

        let mut out = String::new();
        out.push_str("# HELP http_requests_total Requests served, by endpoint\n");
        out.push_str("# TYPE http_requests_total counter\n");
        let _ = writeln!(out, "http_requests_total{{endpoint=\"/health\"}} {health}");
        let _ = writeln!(out, "http_requests_total{{endpoint=\"/predict\"}} {predict}");

        out.push_str("# HELP predict_duration_seconds Predict request latency\n");
        out.push_str("# TYPE predict_duration_seconds histogram\n");
        let mut cumulative = 0u64;
        for (i, bound) in LATENCY_BUCKETS.iter().enumerate() {
            cumulative += self.latency_buckets[i].load(Ordering::Relaxed);
            let _ = writeln!(
                out,
                "predict_duration_seconds_bucket{{le=\"{bound}\"}} {cumulative}"
            );
        }
        cumulative += self.latency_buckets[LATENCY_BUCKETS.len()].load(Ordering::Relaxed);
        let _ = writeln!(
            out,
            "predict_duration_seconds_bucket{{le=\"+Inf\"}} {cumulative}"
        );
        let _ = writeln!(out, "predict_duration_seconds_sum {sum_secs}");
        let _ = writeln!(out, "predict_duration_seconds_count {predict}");

        out
    }
}
