//! Next-song recommendations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::assistant::EventAssistant;
use super::extract::extract_json;
use super::reasoning::ReasoningMode;
use crate::types::{Carol, EventContext};
use crate::{Error, Result};

const OPERATION: &str = "recommend next carol";
const MAX_RECOMMENDATIONS: usize = 3;

const RECOMMEND_SYSTEM: &str = r#"You are the song leader of a caroling group. You pick what to sing next so the set flows: build energy early, hold it in the middle and wind down at the end.
Only recommend carols from the available list, using their exact ids. Respond with JSON only."#;

/// Where the next song should take the set's energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Momentum {
    Building,
    Maintaining,
    WindingDown,
}

impl Momentum {
    /// Lenient parse of model output; anything unrecognised is `Maintaining`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "building" | "build" => Self::Building,
            "winding-down" | "wind-down" | "cooling-down" => Self::WindingDown,
            _ => Self::Maintaining,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub carol_id: String,
    pub reason: String,
    pub momentum: Momentum,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecommendation {
    #[serde(alias = "carol_id", alias = "id")]
    carol_id: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    momentum: Option<String>,
}

fn recommend_prompt(
    event: &EventContext,
    available: &[&Carol],
    played: &[String],
    all: &[Carol],
) -> String {
    let played_titles: Vec<&str> = played
        .iter()
        .map(|id| {
            all.iter()
                .find(|c| &c.id == id)
                .map(|c| c.title.as_str())
                .unwrap_or(id.as_str())
        })
        .collect();

    let mut prompt = format!(
        "Event: {}\nTheme: {}\n\n",
        event.name,
        event.theme.as_deref().unwrap_or("Not specified")
    );

    prompt.push_str("Already sung, in order:\n");
    if played_titles.is_empty() {
        prompt.push_str("- nothing yet\n");
    } else {
        for title in played_titles {
            prompt.push_str(&format!("- {}\n", title));
        }
    }

    prompt.push_str("\nAvailable carols:\n");
    for carol in available {
        prompt.push_str(&format!(
            "- {}: {} ({}, {}, tags: {})\n",
            carol.id,
            carol.title,
            carol.energy.as_str(),
            carol.duration,
            carol.tags.join(", ")
        ));
    }

    prompt.push_str(&format!(
        "\nRecommend up to {} carols to sing next, best first. Respond with JSON of this shape:\n\
         {{\"recommendations\": [{{\"carolId\": \"...\", \"reason\": \"...\", \"momentum\": \"building\" | \"maintaining\" | \"winding-down\"}}]}}",
        MAX_RECOMMENDATIONS
    ));
    prompt
}

/// Keeps recommendations for known, unplayed carols; first mention wins.
fn select(raw: Vec<RawRecommendation>, available: &HashSet<&str>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|r| {
            let id = r.carol_id.trim().to_string();
            if !available.contains(id.as_str()) {
                debug!(carol_id = %id, "Dropping recommendation for unknown carol");
                return None;
            }
            if !seen.insert(id.clone()) {
                return None;
            }
            Some(Recommendation {
                carol_id: id,
                reason: r.reason.trim().to_string(),
                momentum: r
                    .momentum
                    .as_deref()
                    .map(Momentum::parse_lenient)
                    .unwrap_or(Momentum::Maintaining),
            })
        })
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

impl EventAssistant {
    /// Suggests what to sing next from `candidates`, skipping `played` ids.
    ///
    /// Uses the reasoning model; ids the model invents are dropped.
    pub async fn recommend_next(
        &self,
        event: &EventContext,
        candidates: &[Carol],
        played: &[String],
    ) -> Result<Vec<Recommendation>> {
        self.client.ensure_configured()?;
        self.admit(&event.event_id).await?;

        let played_set: HashSet<&str> = played.iter().map(String::as_str).collect();
        let available: Vec<&Carol> = candidates
            .iter()
            .filter(|c| !played_set.contains(c.id.as_str()))
            .collect();
        if available.is_empty() {
            debug!(event_id = %event.event_id, "No unplayed carols to recommend");
            return Ok(Vec::new());
        }

        let prompt = recommend_prompt(event, &available, played, candidates);
        let output = self
            .generate_with_reasoning(&prompt, Some(RECOMMEND_SYSTEM))
            .await?;
        if output.mode == ReasoningMode::Fallback {
            warn!(event_id = %event.event_id, "Recommendations produced without reasoning");
        }

        let list = match extract_json(&output.response).into_result(OPERATION)? {
            list @ Value::Array(_) => list,
            Value::Object(mut map) => map
                .remove("recommendations")
                .ok_or_else(|| Error::malformed(OPERATION, "missing recommendations"))?,
            other => {
                return Err(Error::malformed(
                    OPERATION,
                    format!("expected an object, got {}", other),
                ));
            }
        };
        let raw: Vec<RawRecommendation> =
            serde_json::from_value(list).map_err(|e| Error::malformed(OPERATION, e.to_string()))?;

        let ids: HashSet<&str> = available.iter().map(|c| c.id.as_str()).collect();
        Ok(select(raw, &ids))
    }
}
