//! Prelude module for convenient imports.
//!
//! ```rust
//! use carolers_ai::prelude::*;
//! ```

// Assistant
pub use crate::{AgentConfig, AgentResult, AiRequest, AiResponse, EventAssistant};
pub use crate::{Error, Result};

// Client and configuration
pub use crate::{Client, ModelVariant, Settings};

// Stores
pub use crate::store::{CarolFilter, CarolStore, MemoryStore, MessageStore};

// Tools
pub use crate::tools::{SchemaTool, Tool, ToolAccess, ToolContext, ToolRegistry};
pub use crate::types::ToolResult;

// Types
pub use crate::types::{Carol, Energy, EventContext, EventMessage};
