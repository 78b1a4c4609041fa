//! Generation request types.

use serde::{Deserialize, Serialize};

use crate::types::{Content, ToolDefinition};
use crate::{Error, Result};

/// Token budget used for "high" reasoning effort.
pub const HIGH_THINKING_BUDGET: u32 = 8192;

/// Extended-reasoning switch for models that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingConfig {
    pub include_thoughts: bool,
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    pub fn new(budget_tokens: u32) -> Self {
        Self {
            include_thoughts: true,
            budget_tokens,
        }
    }

    pub fn high() -> Self {
        Self::new(HIGH_THINKING_BUDGET)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub thinking: Option<ThinkingConfig>,
}

/// A single provider-neutral generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub tools: Vec<ToolDefinition>,
    pub generation: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents,
            tools: Vec::new(),
            generation: GenerationConfig::default(),
        }
    }

    /// Single user turn.
    pub fn prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(model, vec![Content::user(prompt)])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        self.system_instruction = (!system.trim().is_empty()).then_some(system);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.generation.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_thinking(mut self, thinking: ThinkingConfig) -> Self {
        self.generation.thinking = Some(thinking);
        self
    }

    pub fn without_thinking(mut self) -> Self {
        self.generation.thinking = None;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::InvalidRequest("model name is empty".into()));
        }
        if self.contents.is_empty() {
            return Err(Error::InvalidRequest("request has no contents".into()));
        }
        if let Some(t) = self.generation.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(Error::InvalidRequest(format!(
                "temperature {t} outside 0.0..=2.0"
            )));
        }
        if self.generation.max_output_tokens == Some(0) {
            return Err(Error::InvalidRequest("max_output_tokens must be positive".into()));
        }
        Ok(())
    }
}
