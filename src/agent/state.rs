//! Loop control and per-run metrics.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::Usage;

/// Whether the tool loop may issue another model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continuing,
    Exhausted,
}

impl LoopControl {
    /// State after `rounds` model calls that all requested tools.
    pub fn after_round(rounds: usize, max_rounds: usize) -> Self {
        if rounds >= max_rounds {
            Self::Exhausted
        } else {
            Self::Continuing
        }
    }

    pub fn can_continue(&self) -> bool {
        matches!(self, Self::Continuing)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub rounds: usize,
    pub api_calls: usize,
    pub tool_calls: usize,
    pub errors: usize,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub thinking_tokens: u32,
    pub api_time_ms: u64,
    pub execution_time_ms: u64,
    pub tool_stats: HashMap<String, ToolStats>,
    /// Concrete model the run was served by.
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStats {
    pub calls: usize,
    pub total_time_ms: u64,
    pub errors: usize,
}

impl AgentMetrics {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    pub fn add_usage(&mut self, usage: &Usage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.thinking_tokens += usage.thinking_tokens;
    }

    pub fn record_api_call(&mut self, duration_ms: u64) {
        self.api_calls += 1;
        self.api_time_ms += duration_ms;
    }

    pub fn record_tool(&mut self, name: &str, duration_ms: u64, is_error: bool) {
        self.tool_calls += 1;
        let stats = self.tool_stats.entry(name.to_string()).or_default();
        stats.calls += 1;
        stats.total_time_ms += duration_ms;
        if is_error {
            stats.errors += 1;
            self.errors += 1;
        }
    }

    pub fn avg_tool_time_ms(&self) -> f64 {
        if self.tool_calls == 0 {
            return 0.0;
        }
        let total: u64 = self.tool_stats.values().map(|s| s.total_time_ms).sum();
        total as f64 / self.tool_calls as f64
    }
}
