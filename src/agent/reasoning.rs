//! Extended-reasoning generation with a plain fallback.

use serde::Serialize;
use tracing::{debug, warn};

use super::assistant::EventAssistant;
use crate::Result;
use crate::client::{GenerateRequest, ThinkingConfig};
use crate::models::ModelVariant;

/// Thinking text reported when the model produced no reasoning trace.
pub const REASONING_PLACEHOLDER: &str = "Reasoning not available";

pub(super) const REASONING_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningMode {
    /// Answered with thinking enabled.
    Reasoned,
    /// Thinking request failed; answered by plain generation.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningOutput {
    pub thinking: String,
    pub response: String,
    pub mode: ReasoningMode,
}

impl ReasoningOutput {
    pub fn is_fallback(&self) -> bool {
        self.mode == ReasoningMode::Fallback
    }
}

impl EventAssistant {
    /// Generates with the pro model and a high thinking budget.
    ///
    /// If the reasoning request fails for any reason, the same prompt is
    /// retried without thinking and the output carries
    /// [`REASONING_PLACEHOLDER`] with [`ReasoningMode::Fallback`]. Only a
    /// failure of that retry is returned as an error.
    pub async fn generate_with_reasoning(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<ReasoningOutput> {
        self.client.ensure_configured()?;
        let model = self.resolve_model(ModelVariant::Pro).await;

        let mut request =
            GenerateRequest::prompt(&model, prompt).with_temperature(REASONING_TEMPERATURE);
        if let Some(system) = system {
            request = request.with_system(system);
        }

        let reasoned = self
            .client
            .send(request.clone().with_thinking(ThinkingConfig::high()))
            .await;

        match reasoned {
            Ok(response) => {
                let thoughts = response.thoughts();
                let thinking = if thoughts.is_empty() {
                    REASONING_PLACEHOLDER.to_string()
                } else {
                    thoughts.join("\n")
                };
                debug!(
                    model = %model,
                    thinking_tokens = response.usage.thinking_tokens,
                    "Reasoning generation completed"
                );
                Ok(ReasoningOutput {
                    thinking,
                    response: response.text(),
                    mode: ReasoningMode::Reasoned,
                })
            }
            Err(e) => {
                warn!(
                    model = %model,
                    error = %e,
                    "Reasoning generation failed, falling back to plain generation"
                );
                self.metrics.record_reasoning_fallback();
                let response = self.client.send(request.without_thinking()).await?;
                Ok(ReasoningOutput {
                    thinking: REASONING_PLACEHOLDER.to_string(),
                    response: response.text(),
                    mode: ReasoningMode::Fallback,
                })
            }
        }
    }
}
