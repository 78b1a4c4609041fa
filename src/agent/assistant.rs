//! Event assistant and its builder.

use std::sync::Arc;

use tracing::{debug, warn};

use super::config::AgentConfig;
use crate::client::Client;
use crate::config::Settings;
use crate::models::{AvailabilityCache, ModelSelector, ModelVariant};
use crate::observability::MetricsRegistry;
use crate::ratelimit::{RateDecision, RateLimiter, SlidingWindowLimiter};
use crate::store::{CarolStore, MessageStore};
use crate::tools::ToolRegistry;
use crate::types::{EventContext, EventMessage};
use crate::{Error, Result};

/// Orchestrates model calls and caroling tools for events.
///
/// Cheap to share behind an `Arc`; all per-run state lives on the stack of
/// [`run`](Self::run).
pub struct EventAssistant {
    pub(super) client: Client,
    pub(super) selector: ModelSelector,
    pub(super) carols: Arc<dyn CarolStore>,
    pub(super) messages: Arc<dyn MessageStore>,
    pub(super) tools: ToolRegistry,
    pub(super) limiter: Arc<dyn RateLimiter>,
    pub(super) metrics: Arc<MetricsRegistry>,
    pub(super) config: AgentConfig,
}

impl EventAssistant {
    pub fn builder() -> EventAssistantBuilder {
        EventAssistantBuilder::default()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    pub fn carols(&self) -> &Arc<dyn CarolStore> {
        &self.carols
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub(super) async fn admit(&self, event_id: &str) -> Result<()> {
        match self.limiter.check(event_id).await {
            RateDecision::Allowed { remaining } => {
                debug!(event_id, remaining, "Request admitted");
                Ok(())
            }
            RateDecision::Limited { retry_after } => {
                self.metrics.record_rate_limited();
                warn!(
                    event_id,
                    retry_after_secs = retry_after.as_secs_f64(),
                    "Rate limit exceeded"
                );
                Err(Error::RateLimit {
                    retry_after: Some(retry_after),
                })
            }
        }
    }

    pub(super) async fn resolve_model(&self, variant: ModelVariant) -> String {
        let model = self.selector.resolve(variant).await;
        if model != self.selector.models().primary(variant) {
            self.metrics.record_model_fallback();
        }
        model
    }

    /// Chat history carried on the event, or loaded from the message store.
    ///
    /// A store failure degrades to an empty history.
    pub(super) async fn load_history(&self, event: &EventContext) -> Vec<EventMessage> {
        if !event.messages.is_empty() {
            return event.messages.clone();
        }
        match self.messages.get_event_messages(&event.event_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    event_id = %event.event_id,
                    store = self.messages.name(),
                    error = %e,
                    "Failed to load chat history"
                );
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for EventAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAssistant")
            .field("client", &self.client)
            .field("tools", &self.tools.names())
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Default)]
pub struct EventAssistantBuilder {
    settings: Option<Settings>,
    client: Option<Client>,
    carols: Option<Arc<dyn CarolStore>>,
    messages: Option<Arc<dyn MessageStore>>,
    cache: Option<Arc<AvailabilityCache>>,
    limiter: Option<Arc<dyn RateLimiter>>,
    metrics: Option<Arc<MetricsRegistry>>,
    config: Option<AgentConfig>,
}

impl EventAssistantBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the client built from settings.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn carols(mut self, store: Arc<dyn CarolStore>) -> Self {
        self.carols = Some(store);
        self
    }

    pub fn messages(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.messages = Some(store);
        self
    }

    /// One store serving both songbook and chat queries.
    pub fn stores<S>(self, store: Arc<S>) -> Self
    where
        S: CarolStore + MessageStore + 'static,
    {
        let carols: Arc<dyn CarolStore> = store.clone();
        let messages: Arc<dyn MessageStore> = store;
        self.carols(carols).messages(messages)
    }

    pub fn availability_cache(mut self, cache: Arc<AvailabilityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<EventAssistant> {
        let settings = self.settings.unwrap_or_default();

        let carols = self
            .carols
            .ok_or_else(|| Error::Config("carol store is required".into()))?;
        let messages = self
            .messages
            .ok_or_else(|| Error::Config("message store is required".into()))?;

        let client = match self.client {
            Some(client) => client,
            None => Client::from_settings(&settings)?,
        };
        if !client.is_configured() {
            warn!("No API key configured; assistant calls will fail until one is set");
        }

        let selector = ModelSelector::with_cache(
            client.clone(),
            settings.models.clone(),
            self.cache.unwrap_or_default(),
        );
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(SlidingWindowLimiter::from_settings(&settings)));
        let config = self
            .config
            .unwrap_or_else(|| AgentConfig::from_settings(&settings));
        let tools = ToolRegistry::builtin(Arc::clone(&carols), Arc::clone(&messages));

        debug!(
            tools = ?tools.names(),
            max_rounds = config.max_rounds,
            variant = %config.variant,
            "Event assistant built"
        );

        Ok(EventAssistant {
            client,
            selector,
            carols,
            messages,
            tools,
            limiter,
            metrics: self.metrics.unwrap_or_default(),
            config,
        })
    }
}
