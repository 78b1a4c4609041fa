//! Resolved runtime settings.

use std::time::Duration;

use secrecy::SecretString;

use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigError, ConfigResult, EnvConfigProvider};
use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::models::ModelConfig;

/// Dotted configuration keys. With [`EnvConfigProvider`] each maps to the
/// upper-snake environment variable (`gemini.api.key` → `GEMINI_API_KEY`).
pub mod keys {
    pub const GEMINI_API_KEY: &str = "gemini.api.key";
    pub const GOOGLE_API_KEY: &str = "google.api.key";
    pub const BASE_URL: &str = "gemini.base.url";
    pub const TIMEOUT_SECS: &str = "carolers.timeout.secs";
    pub const MODEL_PRO: &str = "carolers.model.pro";
    pub const MODEL_PRO_FALLBACK: &str = "carolers.model.pro.fallback";
    pub const MODEL_FLASH: &str = "carolers.model.flash";
    pub const MODEL_FLASH_FALLBACK: &str = "carolers.model.flash.fallback";
    pub const MAX_ROUNDS: &str = "carolers.max.rounds";
    pub const HISTORY_WINDOW: &str = "carolers.history.window";
    pub const RATE_LIMIT_REQUESTS: &str = "carolers.rate.limit.requests";
    pub const RATE_LIMIT_WINDOW_SECS: &str = "carolers.rate.limit.window.secs";
}

pub const DEFAULT_MAX_ROUNDS: usize = 8;
pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 20;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` leaves the assistant unconfigured; calls fail with `NotConfigured`.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout: Duration,
    pub models: ModelConfig,
    pub max_rounds: usize,
    pub history_window: usize,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            models: ModelConfig::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            history_window: DEFAULT_HISTORY_WINDOW,
            rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

impl Settings {
    pub async fn from_env() -> ConfigResult<Self> {
        Self::from_provider(&EnvConfigProvider::new()).await
    }

    pub async fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> ConfigResult<Self> {
        let defaults = Self::default();

        let api_key = match provider.get_string(keys::GEMINI_API_KEY).await? {
            Some(key) => Some(key),
            None => provider.get_string(keys::GOOGLE_API_KEY).await?,
        };

        let timeout = provider
            .get_parsed::<u64>(keys::TIMEOUT_SECS)
            .await?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let mut models = defaults.models;
        for (key, slot) in [
            (keys::MODEL_PRO, &mut models.pro),
            (keys::MODEL_PRO_FALLBACK, &mut models.pro_fallback),
            (keys::MODEL_FLASH, &mut models.flash),
            (keys::MODEL_FLASH_FALLBACK, &mut models.flash_fallback),
        ] {
            if let Some(name) = provider.get_string(key).await? {
                *slot = name;
            }
        }

        let max_rounds = provider
            .get_parsed::<usize>(keys::MAX_ROUNDS)
            .await?
            .unwrap_or(defaults.max_rounds);
        if max_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                key: keys::MAX_ROUNDS.into(),
                message: "must be at least 1".into(),
            });
        }

        let rate_limit_requests = provider
            .get_parsed::<u32>(keys::RATE_LIMIT_REQUESTS)
            .await?
            .unwrap_or(defaults.rate_limit_requests);
        if rate_limit_requests == 0 {
            return Err(ConfigError::InvalidValue {
                key: keys::RATE_LIMIT_REQUESTS.into(),
                message: "must be at least 1".into(),
            });
        }

        let base_url = match provider.get_string(keys::BASE_URL).await? {
            Some(raw) => {
                let parsed = url::Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    key: keys::BASE_URL.into(),
                    message: e.to_string(),
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ConfigError::InvalidValue {
                        key: keys::BASE_URL.into(),
                        message: format!("unsupported scheme: {}", parsed.scheme()),
                    });
                }
                raw
            }
            None => defaults.base_url,
        };

        let settings = Self {
            api_key: api_key.map(SecretString::from),
            base_url,
            timeout,
            models,
            max_rounds,
            history_window: provider
                .get_parsed::<usize>(keys::HISTORY_WINDOW)
                .await?
                .unwrap_or(defaults.history_window),
            rate_limit_requests,
            rate_limit_window: provider
                .get_parsed::<u64>(keys::RATE_LIMIT_WINDOW_SECS)
                .await?
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
        };

        tracing::debug!(
            provider = provider.name(),
            configured = settings.is_configured(),
            pro = %settings.models.pro,
            flash = %settings.models.flash,
            max_rounds = settings.max_rounds,
            "Settings resolved"
        );

        Ok(settings)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.trim().is_empty()).then(|| SecretString::from(key));
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    pub fn with_rate_limit(mut self, requests: u32, window: Duration) -> Self {
        self.rate_limit_requests = requests.max(1);
        self.rate_limit_window = window;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
