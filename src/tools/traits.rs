//! Tool trait definitions.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::context::ToolContext;
use crate::client::schema::function_schema;
use crate::types::{ToolDefinition, ToolError, ToolResult};

/// Core tool trait for all tool implementations.
///
/// Implementations must never panic or propagate errors: every failure is
/// reported as an unsuccessful [`ToolResult`] so the model can explain it.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, args: serde_json::Value, context: &ToolContext) -> ToolResult;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

/// Schema-based tool trait with typed arguments.
///
/// Arguments are decoded into `Self::Args` at the dispatch boundary; a call
/// whose arguments do not fit is rejected with [`ToolError::InvalidInput`]
/// before the handler runs.
#[async_trait]
pub trait SchemaTool: Send + Sync {
    type Args: JsonSchema + DeserializeOwned + Send;
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn handle(
        &self,
        args: Self::Args,
        context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError>;

    fn parameters() -> serde_json::Value {
        function_schema::<Self::Args>()
    }
}

#[async_trait]
impl<T: SchemaTool + 'static> Tool for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn description(&self) -> &str {
        T::DESCRIPTION
    }

    fn parameters(&self) -> serde_json::Value {
        T::parameters()
    }

    async fn execute(&self, args: serde_json::Value, context: &ToolContext) -> ToolResult {
        let args = if args.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            args
        };
        let typed = match serde_json::from_value::<T::Args>(args) {
            Ok(typed) => typed,
            Err(e) => {
                let error = ToolError::invalid_input(T::NAME, e.to_string());
                return ToolResult::from_error(T::NAME, &error);
            }
        };
        match SchemaTool::handle(self, typed, context).await {
            Ok(data) => ToolResult::success(T::NAME, data),
            Err(e) => ToolResult::from_error(T::NAME, &e),
        }
    }
}
