//! Structured span definitions for tracing.

use std::time::Instant;

use tracing::{Level, Span, field, span};

/// Span around one hosted-model call, with latency and usage recorded on finish.
pub struct ApiCallSpan {
    span: Span,
    start: Instant,
}

impl ApiCallSpan {
    pub fn new(model: &str, event_id: &str, round: usize) -> Self {
        let span = span!(
            Level::INFO,
            "model.generate",
            model = model,
            event_id = event_id,
            round = round,
            input_tokens = field::Empty,
            output_tokens = field::Empty,
            latency_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_usage(&self, input_tokens: u32, output_tokens: u32) {
        self.span.record("input_tokens", input_tokens);
        self.span.record("output_tokens", output_tokens);
    }

    /// Records and returns the elapsed time in milliseconds.
    pub fn finish(self) -> f64 {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.span.record("latency_ms", latency_ms as u64);
        latency_ms
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

pub fn tool_span(tool_name: &str, event_id: &str) -> Span {
    span!(
        Level::DEBUG,
        "tool.execute",
        tool_name = tool_name,
        event_id = event_id,
        is_error = field::Empty,
    )
}
