//! searchCarols - songbook search with mood mapping.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::args::{lenient_string, lenient_u32};
use super::{SchemaTool, ToolContext};
use crate::store::{CarolFilter, CarolStore};
use crate::types::{Carol, Energy, ToolError};

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Arguments for the searchCarols tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCarolsArgs {
    /// Free text matched against carol titles, artists and tags.
    pub query: String,
    /// Desired mood: upbeat, relaxing, traditional or religious.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub mood: Option<String>,
    /// Energy level: low, medium or high. Overrides the mood's energy.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub energy: Option<String>,
    /// Maximum number of carols to return (default 5).
    #[serde(default, deserialize_with = "lenient_u32")]
    #[schemars(with = "Option<u32>")]
    pub limit: Option<u32>,
}

/// How a mood narrows the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MoodFilter {
    Energy(Energy),
    Tag(String),
}

pub(crate) fn mood_filter(mood: &str) -> Option<MoodFilter> {
    match mood.trim().to_lowercase().as_str() {
        "upbeat" => Some(MoodFilter::Energy(Energy::High)),
        "relaxing" => Some(MoodFilter::Energy(Energy::Low)),
        tag @ ("traditional" | "religious") => Some(MoodFilter::Tag(tag.to_string())),
        _ => None,
    }
}

/// Field projection returned to the model.
pub(crate) fn project(carol: &Carol) -> serde_json::Value {
    serde_json::json!({
        "id": carol.id,
        "title": carol.title,
        "artist": carol.artist,
        "energy": carol.energy.as_str(),
        "duration": carol.duration,
        "tags": carol.tags,
    })
}

pub struct SearchCarolsTool {
    carols: Arc<dyn CarolStore>,
}

impl SearchCarolsTool {
    pub fn new(carols: Arc<dyn CarolStore>) -> Self {
        Self { carols }
    }
}

#[async_trait]
impl SchemaTool for SearchCarolsTool {
    type Args = SearchCarolsArgs;
    const NAME: &'static str = "searchCarols";
    const DESCRIPTION: &'static str = "Search the event's songbook for carols by text, mood or energy level. \
        Use this when the group asks for song ideas or wants to find a specific carol.";

    async fn handle(
        &self,
        args: SearchCarolsArgs,
        _context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let mut filter = CarolFilter::new().query(args.query.clone());

        match args.mood.as_deref().and_then(mood_filter) {
            Some(MoodFilter::Energy(energy)) => filter = filter.energy(energy),
            Some(MoodFilter::Tag(tag)) => filter = filter.tag(tag),
            None => {}
        }

        if let Some(ref raw) = args.energy {
            let energy = raw
                .parse::<Energy>()
                .map_err(|e| ToolError::invalid_input(Self::NAME, e))?;
            filter = filter.energy(energy);
        }

        let limit = args
            .limit
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_SEARCH_LIMIT);

        let carols = self
            .carols
            .get_carols(&filter)
            .await
            .map_err(|e| ToolError::store(e.to_string()))?;

        let results: Vec<_> = carols.iter().take(limit).map(project).collect();
        tracing::debug!(
            query = %args.query,
            matched = carols.len(),
            returned = results.len(),
            "searchCarols completed"
        );

        Ok(serde_json::json!({
            "query": args.query,
            "count": results.len(),
            "carols": results,
        }))
    }
}
