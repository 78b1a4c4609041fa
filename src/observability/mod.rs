//! Local metrics and structured spans for the assistant.
//!
//! Counters are plain atomics; nothing is exported. Spans go through
//! `tracing`, so whichever subscriber the host installs receives them.

mod metrics;
mod spans;

pub use metrics::{Counter, Gauge, Histogram, MetricsRegistry, MetricsSummary};
pub use spans::{ApiCallSpan, tool_span};
