//! addContribution - suggestions for what members can bring.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::args::lenient_string;
use super::{SchemaTool, ToolContext};
use crate::types::ToolError;

const MAX_GUIDELINE_ITEMS: usize = 2;

/// Contribution category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContributionCategory {
    Food,
    Equipment,
    Music,
    Other,
}

impl ContributionCategory {
    /// Case-insensitive; unrecognized names map to `Other`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_lowercase()).as_deref() {
            Some("food") => Self::Food,
            Some("equipment") => Self::Equipment,
            Some("music") => Self::Music,
            _ => Self::Other,
        }
    }

    pub fn guidelines(&self) -> &'static [&'static str] {
        match self {
            Self::Food => &["Hot cocoa", "Cookies", "Candy canes", "Apple cider"],
            Self::Equipment => &["Song sheets", "Flashlights", "Lanterns", "Portable speaker"],
            Self::Music => &["Pitch pipe", "Jingle bells", "Tambourine", "Sheet music folders"],
            Self::Other => &["Santa hats", "Hand warmers", "Scarves", "Donation jar"],
        }
    }
}

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionSource {
    UserRequested,
    Guideline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub item: String,
    pub category: ContributionCategory,
    pub source: SuggestionSource,
}

/// Arguments for the addContribution tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddContributionArgs {
    /// One of Food, Equipment, Music or Other.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub category: Option<String>,
    /// What the member offered or asked about, e.g. "Hot cocoa".
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub context: Option<String>,
}

pub(crate) fn build_suggestions(
    category: ContributionCategory,
    context: Option<&str>,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    if let Some(item) = context.map(str::trim).filter(|c| !c.is_empty()) {
        suggestions.push(Suggestion {
            item: item.to_string(),
            category,
            source: SuggestionSource::UserRequested,
        });
    }

    let mut added = 0;
    for item in category.guidelines() {
        if added == MAX_GUIDELINE_ITEMS {
            break;
        }
        let duplicate = suggestions
            .iter()
            .any(|s| s.item.eq_ignore_ascii_case(item));
        if !duplicate {
            suggestions.push(Suggestion {
                item: (*item).to_string(),
                category,
                source: SuggestionSource::Guideline,
            });
            added += 1;
        }
    }
    suggestions
}

#[derive(Debug, Default)]
pub struct AddContributionTool;

impl AddContributionTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaTool for AddContributionTool {
    type Args = AddContributionArgs;
    const NAME: &'static str = "addContribution";
    const DESCRIPTION: &'static str = "Suggest items members could bring to the event (Food, Equipment, Music, Other). \
        Use this when someone offers to bring something or asks what is needed.";

    async fn handle(
        &self,
        args: AddContributionArgs,
        _context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let category = ContributionCategory::parse(args.category.as_deref());
        let suggestions = build_suggestions(category, args.context.as_deref());
        let suggestions = serde_json::to_value(&suggestions)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        Ok(serde_json::json!({
            "category": category,
            "suggestions": suggestions,
        }))
    }
}
