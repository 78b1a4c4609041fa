//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::access::ToolAccess;
use super::context::ToolContext;
use super::traits::Tool;
use super::{AddContributionTool, SearchCarolsTool, SuggestSetlistTool, SummarizeChatTool};
use crate::store::{CarolStore, MessageStore};
use crate::types::{ToolDefinition, ToolResult};

/// Immutable set of tools advertised to one model session.
///
/// Definitions are reported in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four caroling tools backed by the given stores.
    pub fn builtin(carols: Arc<dyn CarolStore>, messages: Arc<dyn MessageStore>) -> Self {
        Self::from_tools(vec![
            Arc::new(SearchCarolsTool::new(Arc::clone(&carols))),
            Arc::new(SummarizeChatTool::new(messages)),
            Arc::new(SuggestSetlistTool::new(carols)),
            Arc::new(AddContributionTool::new()),
        ])
    }

    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Registering an existing name replaces that tool in place.
    fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// A registry restricted to the tools `access` allows.
    pub fn filtered(&self, access: &ToolAccess) -> Self {
        Self::from_tools(
            self.tools
                .iter()
                .filter(|t| access.is_allowed(t.name()))
                .cloned()
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    /// Runs a tool by name; unknown names yield an error result, never a panic.
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> ToolResult {
        match self.get(name) {
            Some(tool) => tool.execute(args, context).await,
            None => ToolResult::unknown_tool(name),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
