//! Tool execution results.

use serde::{Deserialize, Serialize};

use super::error::ToolError;

/// Outcome of one tool call, returned to the model as a function response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub success: bool,
    pub tool_name: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(tool_name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            tool_name: tool_name.into(),
            data,
            error: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            tool_name: tool_name.into(),
            data: serde_json::Value::Object(serde_json::Map::new()),
            error: Some(message.into()),
        }
    }

    pub fn from_error(tool_name: impl Into<String>, error: &ToolError) -> Self {
        Self::failure(tool_name, error.to_string())
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::from_error(name, &ToolError::unknown_tool(name))
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }

    /// JSON payload sent back to the model.
    pub fn to_response(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "success": false,
                "toolName": self.tool_name,
                "error": format!("unserializable result: {}", e),
            })
        })
    }
}
