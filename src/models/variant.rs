use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capability tier requested by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    /// Reasoning-capable, slower.
    Pro,
    #[default]
    Flash,
}

impl ModelVariant {
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Pro => &["pro", "reasoning", "large"],
            Self::Flash => &["flash", "fast", "default"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Flash => "flash",
        }
    }
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        [Self::Pro, Self::Flash]
            .into_iter()
            .find(|v| v.aliases().contains(&lower.as_str()))
            .ok_or_else(|| format!("unknown model variant: {s}"))
    }
}
