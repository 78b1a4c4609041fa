//! Tool-related types.

mod call;
mod definition;
mod error;
mod result;

pub use call::ToolCall;
pub use definition::ToolDefinition;
pub use error::ToolError;
pub use result::ToolResult;
