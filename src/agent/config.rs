//! Assistant loop configuration.

use crate::config::Settings;
use crate::config::settings::{DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_ROUNDS};
use crate::models::ModelVariant;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Model calls allowed per run before the loop gives up.
    pub max_rounds: usize,
    /// Chat messages quoted in the system prompt.
    pub history_window: usize,
    pub variant: ModelVariant,
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            history_window: DEFAULT_HISTORY_WINDOW,
            variant: ModelVariant::Flash,
            temperature: None,
        }
    }
}

impl AgentConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_rounds: settings.max_rounds.max(1),
            history_window: settings.history_window,
            ..Self::default()
        }
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
