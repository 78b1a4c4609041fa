//! Atomic metrics collected by the assistant.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Thread-safe atomic counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe atomic gauge.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Fixed-bucket histogram.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    bucket_bounds: Vec<f64>,
    // Scaled by 1000 to keep sub-millisecond precision in an integer.
    sum: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(bucket_bounds: Vec<f64>) -> Self {
        let buckets = (0..=bucket_bounds.len())
            .map(|_| AtomicU64::new(0))
            .collect();
        Self {
            buckets,
            bucket_bounds,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Millisecond buckets sized for hosted-model latency.
    pub fn default_latency() -> Self {
        Self::new(vec![
            100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0, 120000.0,
        ])
    }

    pub fn observe(&self, value: f64) {
        let bucket_idx = self
            .bucket_bounds
            .iter()
            .position(|&bound| value <= bound)
            .unwrap_or(self.bucket_bounds.len());

        self.buckets[bucket_idx].fetch_add(1, Ordering::Relaxed);
        self.sum
            .fetch_add((value.max(0.0) * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn bucket_counts(&self) -> Vec<u64> {
        self.buckets
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }

    pub fn sum_ms(&self) -> f64 {
        self.sum.load(Ordering::Relaxed) as f64 / 1000.0
    }
}

/// Process-wide assistant metrics, shared across calls via `Arc`.
///
/// Per-call figures live in `crate::agent::AgentMetrics`.
#[derive(Debug)]
pub struct MetricsRegistry {
    pub requests_total: Counter,
    pub requests_success: Counter,
    pub requests_error: Counter,
    pub requests_rate_limited: Counter,
    pub api_calls: Counter,
    pub tokens_input: Counter,
    pub tokens_output: Counter,
    pub tool_calls_total: Counter,
    pub tool_errors: Counter,
    pub model_fallbacks: Counter,
    pub reasoning_fallbacks: Counter,
    pub active_requests: Gauge,
    pub api_latency_ms: Histogram,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self {
            requests_total: Counter::new(),
            requests_success: Counter::new(),
            requests_error: Counter::new(),
            requests_rate_limited: Counter::new(),
            api_calls: Counter::new(),
            tokens_input: Counter::new(),
            tokens_output: Counter::new(),
            tool_calls_total: Counter::new(),
            tool_errors: Counter::new(),
            model_fallbacks: Counter::new(),
            reasoning_fallbacks: Counter::new(),
            active_requests: Gauge::new(),
            api_latency_ms: Histogram::default_latency(),
        }
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request_start(&self) {
        self.requests_total.inc();
        self.active_requests.inc();
    }

    pub fn record_request_end(&self, success: bool) {
        self.active_requests.dec();
        if success {
            self.requests_success.inc();
        } else {
            self.requests_error.inc();
        }
    }

    pub fn record_rate_limited(&self) {
        self.requests_rate_limited.inc();
    }

    pub fn record_api_call(&self, latency_ms: f64, input_tokens: u32, output_tokens: u32) {
        self.api_calls.inc();
        self.api_latency_ms.observe(latency_ms);
        self.tokens_input.add(input_tokens as u64);
        self.tokens_output.add(output_tokens as u64);
    }

    pub fn record_tool_call(&self, success: bool) {
        self.tool_calls_total.inc();
        if !success {
            self.tool_errors.inc();
        }
    }

    pub fn record_model_fallback(&self) {
        self.model_fallbacks.inc();
    }

    pub fn record_reasoning_fallback(&self) {
        self.reasoning_fallbacks.inc();
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from_registry(self)
    }
}

/// Point-in-time snapshot of a [`MetricsRegistry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub api_calls: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_tool_calls: u64,
    pub failed_tool_calls: u64,
    pub model_fallbacks: u64,
    pub reasoning_fallbacks: u64,
    pub avg_latency_ms: f64,
}

impl MetricsSummary {
    pub fn from_registry(registry: &MetricsRegistry) -> Self {
        let count = registry.api_latency_ms.count();
        let avg_latency = if count > 0 {
            registry.api_latency_ms.sum_ms() / count as f64
        } else {
            0.0
        };

        Self {
            total_requests: registry.requests_total.get(),
            successful_requests: registry.requests_success.get(),
            failed_requests: registry.requests_error.get(),
            rate_limited_requests: registry.requests_rate_limited.get(),
            api_calls: registry.api_calls.get(),
            total_input_tokens: registry.tokens_input.get(),
            total_output_tokens: registry.tokens_output.get(),
            total_tool_calls: registry.tool_calls_total.get(),
            failed_tool_calls: registry.tool_errors.get(),
            model_fallbacks: registry.model_fallbacks.get(),
            reasoning_fallbacks: registry.reasoning_fallbacks.get(),
            avg_latency_ms: avg_latency,
        }
    }
}
