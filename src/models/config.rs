use serde::{Deserialize, Serialize};

use super::ModelVariant;

pub const DEFAULT_PRO_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_PRO_FALLBACK_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FLASH_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_FLASH_FALLBACK_MODEL: &str = "gemini-2.0-flash";

/// Primary and fallback model names per variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub pro: String,
    pub pro_fallback: String,
    pub flash: String,
    pub flash_fallback: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pro: DEFAULT_PRO_MODEL.into(),
            pro_fallback: DEFAULT_PRO_FALLBACK_MODEL.into(),
            flash: DEFAULT_FLASH_MODEL.into(),
            flash_fallback: DEFAULT_FLASH_FALLBACK_MODEL.into(),
        }
    }
}

impl ModelConfig {
    pub fn primary(&self, variant: ModelVariant) -> &str {
        match variant {
            ModelVariant::Pro => &self.pro,
            ModelVariant::Flash => &self.flash,
        }
    }

    pub fn fallback(&self, variant: ModelVariant) -> &str {
        match variant {
            ModelVariant::Pro => &self.pro_fallback,
            ModelVariant::Flash => &self.flash_fallback,
        }
    }

    pub fn with_pro(mut self, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.pro = primary.into();
        self.pro_fallback = fallback.into();
        self
    }

    pub fn with_flash(mut self, primary: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.flash = primary.into();
        self.flash_fallback = fallback.into();
        self
    }
}
