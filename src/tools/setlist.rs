//! suggestSetlist - duration-bounded setlist from a theme.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::args::{lenient_string, lenient_u32};
use super::search::project;
use super::{SchemaTool, ToolContext};
use crate::store::{CarolFilter, CarolStore};
use crate::types::carol::format_duration;
use crate::types::{Carol, ToolError};

pub const DEFAULT_SONG_COUNT: usize = 5;
const MAX_SONG_COUNT: usize = 50;
/// Average minutes budgeted per song.
const MINUTES_PER_SONG: u32 = 3;

/// Arguments for the suggestSetlist tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSetlistArgs {
    /// Theme or occasion, used as the songbook search text.
    pub theme: String,
    /// Planned length, e.g. "30 minutes", "45", "one hour", "two hours".
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub duration: Option<String>,
    /// Number of songs wanted when no duration is given (default 5).
    #[serde(default, deserialize_with = "lenient_u32")]
    #[schemars(with = "Option<u32>")]
    pub count: Option<u32>,
}

/// Maps a coarse duration phrase to a song count.
pub(crate) fn estimate_song_count(duration: Option<&str>, count: Option<u32>) -> usize {
    let fallback = || {
        count
            .map(|c| (c as usize).clamp(1, MAX_SONG_COUNT))
            .unwrap_or(DEFAULT_SONG_COUNT)
    };
    let Some(duration) = duration.map(str::to_lowercase) else {
        return fallback();
    };
    if duration.contains("30") {
        3
    } else if duration.contains("45") || duration.contains("one hour") {
        5
    } else if duration.contains('2') || duration.contains("two") {
        10
    } else {
        fallback()
    }
}

/// Takes carols in order while the running total stays under `budget_secs`.
pub(crate) fn greedy_fill(carols: &[Carol], max_songs: usize, budget_secs: u32) -> Vec<&Carol> {
    let mut picked = Vec::new();
    let mut running = 0u32;
    for carol in carols {
        if picked.len() >= max_songs {
            break;
        }
        let secs = carol.duration_secs();
        let next = running.saturating_add(secs);
        if next < budget_secs {
            running = next;
            picked.push(carol);
        }
    }
    picked
}

pub struct SuggestSetlistTool {
    carols: Arc<dyn CarolStore>,
}

impl SuggestSetlistTool {
    pub fn new(carols: Arc<dyn CarolStore>) -> Self {
        Self { carols }
    }
}

#[async_trait]
impl SchemaTool for SuggestSetlistTool {
    type Args = SuggestSetlistArgs;
    const NAME: &'static str = "suggestSetlist";
    const DESCRIPTION: &'static str = "Build a setlist for a theme that fits the planned performance length. \
        Use this when the group asks what to sing and for how long.";

    async fn handle(
        &self,
        args: SuggestSetlistArgs,
        _context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let estimated = estimate_song_count(args.duration.as_deref(), args.count);
        let budget_secs = estimated as u32 * MINUTES_PER_SONG * 60;

        let themed = self
            .carols
            .get_carols(&CarolFilter::new().query(args.theme.clone()))
            .await
            .map_err(|e| ToolError::store(e.to_string()))?;

        let mut songs: Vec<Carol> = greedy_fill(&themed, estimated, budget_secs)
            .into_iter()
            .cloned()
            .collect();

        let fallback = songs.is_empty();
        if fallback {
            tracing::debug!(theme = %args.theme, "No themed carols fit, using unfiltered songbook");
            songs = self
                .carols
                .get_carols(&CarolFilter::new())
                .await
                .map_err(|e| ToolError::store(e.to_string()))?
                .into_iter()
                .take(estimated)
                .collect();
        }

        let total: u64 = songs.iter().map(|c| u64::from(c.duration_secs())).sum();

        Ok(serde_json::json!({
            "theme": args.theme,
            "estimatedCount": estimated,
            "songCount": songs.len(),
            "songs": songs.iter().map(project).collect::<Vec<_>>(),
            "totalDuration": total,
            "totalDurationLabel": format_duration(total),
            "fallback": fallback,
        }))
    }
}
