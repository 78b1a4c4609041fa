//! Function calls requested by the model.

use serde::{Deserialize, Serialize};

/// A tool invocation produced by the model in one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        let args = if args.is_null() { empty_args() } else { args };
        Self {
            name: name.into(),
            args,
        }
    }
}
