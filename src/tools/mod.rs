//! Caroling tools exposed to the model.

mod access;
mod args;
mod context;
mod contribution;
mod registry;
mod search;
mod setlist;
mod summarize;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use access::ToolAccess;
pub use context::ToolContext;
pub use contribution::{
    AddContributionArgs, AddContributionTool, ContributionCategory, Suggestion, SuggestionSource,
};
pub use registry::ToolRegistry;
pub use search::{DEFAULT_SEARCH_LIMIT, SearchCarolsArgs, SearchCarolsTool};
pub use setlist::{DEFAULT_SONG_COUNT, SuggestSetlistArgs, SuggestSetlistTool};
pub use summarize::{DEFAULT_MESSAGE_COUNT, SummarizeChatArgs, SummarizeChatTool};
pub use traits::{SchemaTool, Tool};
