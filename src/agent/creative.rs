//! Carol writing and translation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::assistant::EventAssistant;
use super::extract::parse_json_as;
use crate::client::GenerateRequest;
use crate::models::ModelVariant;
use crate::types::{Carol, Energy};
use crate::{Error, Result};

const CREATIVE_TEMPERATURE: f32 = 0.9;
const TRANSLATION_TEMPERATURE: f32 = 0.3;

const SONGWRITER_PROMPT: &str = r#"You write short, singable carols for amateur groups walking door to door.
Keep lines easy to remember and verses short. Respond with a single JSON object and nothing else."#;

const GENERATE_FORMAT: &str = r#"Respond with JSON of this shape:
{"title": "...", "lyrics": ["line 1", "line 2", "..."], "energy": "low" | "medium" | "high", "tags": ["..."]}"#;

const TRANSLATE_FORMAT: &str = r#"Respond with JSON of this shape:
{"title": "...", "lyrics": ["line 1", "line 2", "..."]}
Keep one translated line per original line where possible and preserve the rhythm so the carol stays singable."#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarolRequest {
    pub theme: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CarolRequest {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            mood: None,
            language: None,
        }
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn prompt(&self) -> String {
        let mut prompt = format!("Write an original carol about: {}\n", self.theme.trim());
        if let Some(mood) = self.mood.as_deref().filter(|m| !m.trim().is_empty()) {
            prompt.push_str(&format!("Mood: {}\n", mood.trim()));
        }
        if let Some(language) = self.language.as_deref().filter(|l| !l.trim().is_empty()) {
            prompt.push_str(&format!("Write the lyrics in {}.\n", language.trim()));
        }
        prompt.push('\n');
        prompt.push_str(GENERATE_FORMAT);
        prompt
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCarol {
    pub title: String,
    pub lyrics: Vec<String>,
    pub energy: Energy,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedCarol {
    pub title: String,
    pub lyrics: Vec<String>,
    pub language: String,
}

/// Lyrics arrive either as a list of lines or as one newline-separated string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lyrics {
    Lines(Vec<String>),
    Text(String),
}

impl Default for Lyrics {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl Lyrics {
    fn into_lines(self) -> Vec<String> {
        let lines = match self {
            Self::Lines(lines) => lines,
            Self::Text(text) => text.lines().map(str::to_string).collect(),
        };
        lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawCarol {
    #[serde(default)]
    title: String,
    #[serde(default)]
    lyrics: Lyrics,
    #[serde(default)]
    energy: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl RawCarol {
    fn title(&self, operation: &str) -> Result<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::malformed(operation, "missing title"));
        }
        Ok(title.to_string())
    }
}

impl EventAssistant {
    /// Writes a new carol for `request.theme` with the flash model.
    pub async fn generate_carol(&self, request: &CarolRequest) -> Result<GeneratedCarol> {
        const OPERATION: &str = "generate carol";

        self.client.ensure_configured()?;
        if request.theme.trim().is_empty() {
            return Err(Error::InvalidRequest("theme must not be empty".into()));
        }

        let model = self.resolve_model(ModelVariant::Flash).await;
        let response = self
            .client
            .send(
                GenerateRequest::prompt(&model, request.prompt())
                    .with_system(SONGWRITER_PROMPT)
                    .with_temperature(CREATIVE_TEMPERATURE),
            )
            .await?;

        let raw: RawCarol = parse_json_as(&response.text(), OPERATION)?;
        let title = raw.title(OPERATION)?;
        let lyrics = raw.lyrics.into_lines();
        if lyrics.is_empty() {
            return Err(Error::malformed(OPERATION, "missing lyrics"));
        }

        let energy = raw
            .energy
            .as_deref()
            .and_then(|e| e.parse().ok())
            .unwrap_or(Energy::Medium);

        debug!(model = %model, title = %title, lines = lyrics.len(), "Carol generated");

        Ok(GeneratedCarol {
            title,
            lyrics,
            energy,
            tags: raw
                .tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        })
    }

    /// Translates a songbook carol's title and lyrics into `language`.
    ///
    /// The translation may have a different number of lines than the original.
    pub async fn translate_carol(&self, carol: &Carol, language: &str) -> Result<TranslatedCarol> {
        const OPERATION: &str = "translate carol";

        self.client.ensure_configured()?;
        let language = language.trim();
        if language.is_empty() {
            return Err(Error::InvalidRequest("language must not be empty".into()));
        }
        if carol.lyrics.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "carol {} has no lyrics to translate",
                carol.id
            )));
        }

        let prompt = format!(
            "Translate this carol into {}.\n\nTitle: {}\n\nLyrics:\n{}\n\n{}",
            language,
            carol.title,
            carol.lyrics.join("\n"),
            TRANSLATE_FORMAT
        );

        let model = self.resolve_model(ModelVariant::Flash).await;
        let response = self
            .client
            .send(
                GenerateRequest::prompt(&model, prompt)
                    .with_system(SONGWRITER_PROMPT)
                    .with_temperature(TRANSLATION_TEMPERATURE),
            )
            .await?;

        let raw: RawCarol = parse_json_as(&response.text(), OPERATION)?;
        let title = raw.title(OPERATION)?;
        let lyrics = raw.lyrics.into_lines();
        if lyrics.is_empty() {
            return Err(Error::malformed(OPERATION, "missing lyrics"));
        }
        if lyrics.len() != carol.lyrics.len() {
            debug!(
                carol = %carol.id,
                original = carol.lyrics.len(),
                translated = lyrics.len(),
                "Translated line count differs"
            );
        }

        Ok(TranslatedCarol {
            title,
            lyrics,
            language: language.to_string(),
        })
    }
}
