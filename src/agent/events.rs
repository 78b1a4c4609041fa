//! Run results and the HTTP request/response contract.

use serde::{Deserialize, Serialize};

use super::state::AgentMetrics;
use crate::types::ToolResult;

/// One dispatched tool call, in the order the model requested it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub tool: String,
    pub args: serde_json::Value,
    pub result: ToolResult,
}

#[derive(Debug, Clone)]
pub struct AgentResult {
    /// Final plain-text answer.
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub metrics: AgentMetrics,
    pub model: String,
}

impl AgentResult {
    pub fn tools_used(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|r| r.tool.as_str()).collect()
    }
}

/// Body accepted by the assistant endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub prompt: String,
    /// Restricts the model to this single tool.
    #[serde(default)]
    pub tool: Option<String>,
}

impl AiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tool: None,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl From<AgentResult> for AiResponse {
    fn from(result: AgentResult) -> Self {
        Self {
            response: result.response,
            tool_calls: result.tool_calls,
        }
    }
}
