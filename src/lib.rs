//! # carolers-ai
//!
//! AI orchestration for group caroling events.
//!
//! The crate drives a hosted generative model through a function-calling
//! loop: the model is given a prompt plus a registry of carol-aware tools,
//! the tools it selects are executed against the event's carol and chat
//! stores, and their results are fed back until the model answers in plain
//! text.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use carolers_ai::{EventAssistant, EventContext, Settings, ToolAccess};
//! use carolers_ai::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), carolers_ai::Error> {
//!     let settings = Settings::from_env().await?;
//!     let store = Arc::new(MemoryStore::new());
//!     let assistant = EventAssistant::builder()
//!         .settings(settings)
//!         .carols(store.clone())
//!         .messages(store)
//!         .build()?;
//!
//!     let event = EventContext::new("evt-1", "Maple Street Carols").theme("Traditional");
//!     let result = assistant
//!         .run("Plan a 45 minute set for us", &event, ToolAccess::all())
//!         .await?;
//!     println!("{}", result.response);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod client;
pub mod config;
pub mod models;
pub mod observability;
pub mod prelude;
pub mod ratelimit;
pub mod store;
pub mod tools;
pub mod types;

pub use agent::{
    AgentConfig, AgentMetrics, AgentResult, AiRequest, AiResponse, CarolRequest, EventAssistant,
    EventAssistantBuilder, GeneratedCarol, JsonExtraction, LoopControl, Momentum,
    REASONING_PLACEHOLDER, ReasoningMode, ReasoningOutput, Recommendation, ToolCallRecord,
    ToolStats, TranslatedCarol, extract_json, parse_json_as,
};
pub use client::{
    Client, GeminiAdapter, GenerateRequest, GenerationConfig, ProviderAdapter, ProviderConfig,
    ThinkingConfig,
};
pub use config::{
    ConfigError, ConfigProvider, ConfigProviderExt, EnvConfigProvider, MemoryConfigProvider,
    Settings,
};
pub use models::{AvailabilityCache, ModelConfig, ModelSelector, ModelVariant};
pub use observability::{Counter, Histogram, MetricsRegistry, MetricsSummary};
pub use ratelimit::{RateDecision, RateLimiter, SlidingWindowLimiter};
pub use store::{CarolFilter, CarolStore, MemoryStore, MessageStore, StoreError};
pub use tools::{
    AddContributionTool, SchemaTool, SearchCarolsTool, SuggestSetlistTool, SummarizeChatTool,
    Tool, ToolAccess, ToolContext, ToolRegistry,
};
pub use types::{
    Carol, Content, Energy, EventContext, EventMessage, GenerateResponse, Part, Role, ToolCall,
    ToolDefinition, ToolError, ToolResult, Usage,
};

/// Error type for carolers-ai operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Hosted model returned an error response.
    #[error("API error (HTTP {status}): {message}", status = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()))]
    Api {
        message: String,
        status: Option<u16>,
        error_type: Option<String>,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tool execution failed.
    #[error("Tool execution failed: {0}")]
    Tool(#[from] types::ToolError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No credentials are available for the hosted model.
    #[error("AI client not configured: {0}")]
    NotConfigured(String),

    /// Carol or message store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Request rate limit exceeded.
    #[error("Rate limit exceeded{}", match retry_after {
        Some(d) => format!(", retry in {:.0}s", d.as_secs_f64()),
        None => String::new(),
    })]
    RateLimit {
        retry_after: Option<std::time::Duration>,
    },

    /// The model kept requesting tools past the configured round limit.
    #[error("Tool loop exhausted after {rounds} rounds")]
    ToolLoopExhausted { rounds: usize },

    /// The model's free-text output did not contain usable JSON.
    #[error("Failed to {operation}: {reason}")]
    MalformedOutput { operation: String, reason: String },

    /// Request parameters are invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation exceeded timeout.
    #[error("Operation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication or authorization failures (401, 403)
    Authorization,
    /// Configuration, parsing, or setup errors
    Configuration,
    /// Network, rate limit, or transient errors that may succeed on retry
    Transient,
    /// Internal errors (JSON, store, unexpected states)
    Internal,
    /// Resource limits (rounds, timeout)
    ResourceLimit,
}

impl Error {
    pub fn malformed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedOutput {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api {
                status: Some(401 | 403),
                ..
            } => ErrorCategory::Authorization,

            Error::Config(_)
            | Error::NotConfigured(_)
            | Error::Parse(_)
            | Error::InvalidRequest(_) => ErrorCategory::Configuration,

            Error::Network(_) | Error::RateLimit { .. } => ErrorCategory::Transient,
            Error::Api {
                status: Some(429 | 500..=599),
                ..
            } => ErrorCategory::Transient,

            Error::ToolLoopExhausted { .. } | Error::Timeout(_) => ErrorCategory::ResourceLimit,

            Error::Json(_)
            | Error::Tool(_)
            | Error::Store(_)
            | Error::MalformedOutput { .. }
            | Error::Api { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_resource_limit(&self) -> bool {
        self.category() == ErrorCategory::ResourceLimit
    }

    /// Whether the hosted model reported the requested model as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Api {
                status: Some(404), ..
            } => true,
            Error::Api {
                error_type: Some(t),
                ..
            } if t == "NOT_FOUND" => true,
            Error::Api {
                message,
                status: None,
                ..
            } => {
                let lower = message.to_lowercase();
                lower.contains("404") || lower.contains("not found")
            }
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// HTTP status an outer web layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::RateLimit { .. } => 429,
            Error::InvalidRequest(_) => 400,
            Error::Api {
                status: Some(401 | 403),
                ..
            } => 401,
            _ => 500,
        }
    }

    pub fn retry_after(&self) -> Option<std::time::Duration> {
        match self {
            Error::RateLimit { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
            config::ConfigError::Provider { message } => Error::Config(message),
        }
    }
}

impl From<store::StoreError> for Error {
    fn from(err: store::StoreError) -> Self {
        Error::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
