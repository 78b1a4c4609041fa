//! System prompts for the event assistant.

use crate::types::{EventContext, EventMessage};

/// Assistant identity and tool guidance, always included.
pub const ASSISTANT_PROMPT: &str = r#"You are the Carolers assistant, helping a group organise a caroling event.

# Tools

- Use searchCarols to look up songs in the shared songbook before recommending them. Never invent carols that are not in the songbook.
- Use summarizeChat when asked what the group has been discussing or how people feel.
- Use suggestSetlist to build a setlist for a target duration; report the songs in the order returned and quote the total duration.
- Use addContribution when someone asks what to bring or who is bringing what.
- Call several tools in one turn when they do not depend on each other.

# Style

- Keep answers short, friendly and practical.
- When a tool reports an error, say what went wrong in plain words and suggest a next step."#;

pub const NO_MESSAGES: &str = "No messages yet.";

/// Full system prompt for one event: identity, event details and recent chat.
pub fn system_prompt(event: &EventContext, history: &[EventMessage], window: usize) -> String {
    let mut prompt = String::from(ASSISTANT_PROMPT);

    prompt.push_str("\n\n# Event\n\n");
    prompt.push_str(&format!("Name: {}\n", event.name));
    prompt.push_str(&format!(
        "Theme: {}\n",
        event.theme.as_deref().unwrap_or("Not specified")
    ));

    prompt.push_str("\n# Recent messages\n\n");
    prompt.push_str(&recent_messages(history, window));
    prompt
}

/// The last `window` messages as `- name: text` lines, oldest first.
pub fn recent_messages(history: &[EventMessage], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];
    if recent.is_empty() {
        return NO_MESSAGES.to_string();
    }
    recent
        .iter()
        .map(|m| format!("- {}: {}", m.author(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}
