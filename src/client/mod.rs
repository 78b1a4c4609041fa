//! Hosted model client.

pub mod adapter;
mod config;
mod request;
pub mod schema;

pub use adapter::{GeminiAdapter, ProviderAdapter};
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ProviderConfig};
pub use request::{GenerateRequest, GenerationConfig, HIGH_THINKING_BUDGET, ThinkingConfig};
pub use schema::{function_schema, transform_for_functions};

use std::sync::Arc;

use crate::config::Settings;
use crate::types::GenerateResponse;
use crate::{Error, Result};

#[derive(Clone)]
pub struct Client {
    adapter: Arc<dyn ProviderAdapter>,
    http: reqwest::Client,
}

impl Client {
    pub fn new(adapter: impl ProviderAdapter + 'static) -> Result<Self> {
        Self::with_timeout(adapter, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        adapter: impl ProviderAdapter + 'static,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            adapter: Arc::new(adapter),
            http,
        })
    }

    pub fn with_http(adapter: impl ProviderAdapter + 'static, http: reqwest::Client) -> Self {
        Self {
            adapter: Arc::new(adapter),
            http,
        }
    }

    /// Gemini client from resolved settings. Succeeds without an API key.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = ProviderConfig::from(settings);
        let timeout = config.timeout;
        Self::with_timeout(GeminiAdapter::new(config), timeout)
    }

    pub fn is_configured(&self) -> bool {
        self.adapter.is_configured()
    }

    pub fn ensure_configured(&self) -> Result<()> {
        if self.adapter.is_configured() {
            Ok(())
        } else {
            Err(Error::NotConfigured(format!(
                "{} API key is not set (GEMINI_API_KEY or GOOGLE_API_KEY)",
                self.adapter.name()
            )))
        }
    }

    pub async fn send(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        self.ensure_configured()?;
        request.validate()?;
        self.adapter.send(&self.http, request).await
    }

    /// Plain single-turn generation.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self.send(GenerateRequest::prompt(model, prompt)).await?;
        Ok(response.text())
    }

    pub fn adapter(&self) -> &dyn ProviderAdapter {
        self.adapter.as_ref()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("provider", &self.adapter.name())
            .field("configured", &self.adapter.is_configured())
            .finish()
    }
}
