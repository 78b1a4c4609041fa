//! Pluggable configuration providers and resolved settings.
//!
//! ```rust,no_run
//! use carolers_ai::config::{EnvConfigProvider, Settings};
//!
//! # async fn example() -> Result<(), carolers_ai::config::ConfigError> {
//! let settings = Settings::from_provider(&EnvConfigProvider::new()).await?;
//! println!("max rounds: {}", settings.max_rounds);
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod memory;
pub mod provider;
pub mod settings;

pub use env::EnvConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{Settings, keys};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key not found
    #[error("Key not found: {key}")]
    NotFound { key: String },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Provider error: {message}")]
    Provider { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
