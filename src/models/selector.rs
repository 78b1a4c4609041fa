use std::sync::Arc;

use tracing::{debug, warn};

use super::{AvailabilityCache, ModelConfig, ModelVariant};
use crate::client::{Client, GenerateRequest};

/// Prompt of the one-off trial generation used to probe a model.
pub const PROBE_PROMPT: &str = "ping";

/// Resolves a variant to a concrete model name, downgrading to the
/// variant's fallback when the primary model does not exist.
///
/// Only a not-found answer marks a model unavailable; any other probe
/// failure (quota, network, auth) leaves the primary in use.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    client: Client,
    models: ModelConfig,
    cache: Arc<AvailabilityCache>,
}

impl ModelSelector {
    pub fn new(client: Client, models: ModelConfig) -> Self {
        Self::with_cache(client, models, Arc::new(AvailabilityCache::new()))
    }

    pub fn with_cache(client: Client, models: ModelConfig, cache: Arc<AvailabilityCache>) -> Self {
        Self {
            client,
            models,
            cache,
        }
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    pub fn cache(&self) -> &Arc<AvailabilityCache> {
        &self.cache
    }

    pub async fn resolve(&self, variant: ModelVariant) -> String {
        let primary = self.models.primary(variant);
        if self.is_available(primary).await {
            primary.to_string()
        } else {
            self.models.fallback(variant).to_string()
        }
    }

    /// Whether `resolve` would currently return the variant's fallback.
    pub fn is_downgraded(&self, variant: ModelVariant) -> bool {
        self.cache.get(self.models.primary(variant)) == Some(false)
    }

    async fn is_available(&self, model: &str) -> bool {
        if let Some(known) = self.cache.get(model) {
            return known;
        }

        // Concurrent first calls may both probe; the last write wins and
        // both agree in practice.
        let available = match self
            .client
            .send(GenerateRequest::prompt(model, PROBE_PROMPT))
            .await
        {
            Ok(_) => true,
            Err(e) if e.is_not_found() => {
                warn!(
                    model,
                    error = %e,
                    "Model not found, switching to fallback"
                );
                false
            }
            Err(e) => {
                debug!(model, error = %e, "Model probe failed, assuming available");
                true
            }
        };

        self.cache.mark(model, available);
        available
    }
}
