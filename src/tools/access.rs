//! Tool access control definitions.

use std::collections::HashSet;

/// Controls which tools a session advertises to the model.
#[derive(Debug, Clone, Default)]
pub enum ToolAccess {
    /// No tools are allowed.
    None,
    /// All tools are allowed.
    #[default]
    All,
    /// Only the specified tools are allowed.
    Only(HashSet<String>),
    /// All tools except the specified ones are allowed.
    Except(HashSet<String>),
}

impl ToolAccess {
    pub fn all() -> Self {
        Self::All
    }

    pub fn none() -> Self {
        Self::None
    }

    pub fn only(tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Only(tools.into_iter().map(Into::into).collect())
    }

    pub fn except(tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Except(tools.into_iter().map(Into::into).collect())
    }

    /// Access for an optional forced tool, as sent by the HTTP layer.
    pub fn forced(tool: Option<&str>) -> Self {
        match tool.map(str::trim).filter(|t| !t.is_empty()) {
            Some(name) => Self::only([name]),
            None => Self::All,
        }
    }

    #[inline]
    pub fn is_allowed(&self, tool_name: &str) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(allowed) => allowed.contains(tool_name),
            Self::Except(denied) => !denied.contains(tool_name),
        }
    }
}
