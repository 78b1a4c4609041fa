//! Model variants and availability-aware model selection.

mod availability;
mod config;
mod selector;
mod variant;

pub use availability::AvailabilityCache;
pub use config::{
    DEFAULT_FLASH_FALLBACK_MODEL, DEFAULT_FLASH_MODEL, DEFAULT_PRO_FALLBACK_MODEL,
    DEFAULT_PRO_MODEL, ModelConfig,
};
pub use selector::{ModelSelector, PROBE_PROMPT};
pub use variant::ModelVariant;
