//! Event assistant: the tool-calling loop and the generation helpers built on it.

mod assistant;
mod config;
mod creative;
mod events;
mod execution;
mod extract;
mod prompt;
mod reasoning;
mod recommend;
mod state;

#[cfg(test)]
mod tests;

pub use assistant::{EventAssistant, EventAssistantBuilder};
pub use config::AgentConfig;
pub use creative::{CarolRequest, GeneratedCarol, TranslatedCarol};
pub use events::{AgentResult, AiRequest, AiResponse, ToolCallRecord};
pub use extract::{JsonExtraction, extract_json, parse_json_as};
pub use reasoning::{REASONING_PLACEHOLDER, ReasoningMode, ReasoningOutput};
pub use recommend::{Momentum, Recommendation};
pub use state::{AgentMetrics, LoopControl, ToolStats};
