//! Core types shared by the client, tools and orchestration loop.

pub(crate) mod carol;
mod message;
mod response;
mod tool;

pub use carol::{Carol, Energy, EventContext, EventMessage};
pub use message::{Content, Part, Role};
pub use response::{FinishReason, GenerateResponse, Usage};
pub use tool::{ToolCall, ToolDefinition, ToolError, ToolResult};
