//! Execution context for tool calls.

/// Per-session information available to every tool call.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    event_id: String,
}

impl ToolContext {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
        }
    }

    /// Event the conversation belongs to.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}
