//! summarizeChat - topic and sentiment digest of recent event chat.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;

use super::args::{lenient_string, lenient_u32};
use super::{SchemaTool, ToolContext};
use crate::store::MessageStore;
use crate::types::{EventMessage, ToolError};

pub const DEFAULT_MESSAGE_COUNT: usize = 10;

const POSITIVE_MARKERS: &[&str] = &[
    "great", "love", "excited", "awesome", "perfect", "can't wait", "yay",
];

fn topic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(carol|song|sing|music|perform|duration|venue|date|time|theme)")
            .expect("valid topic regex")
    })
}

/// Arguments for the summarizeChat tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeChatArgs {
    /// Event whose chat to summarize. Defaults to the current event.
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "Option<String>")]
    pub event_id: Option<String>,
    /// How many of the most recent messages to include (default 10).
    #[serde(default, deserialize_with = "lenient_u32")]
    #[schemars(with = "Option<u32>")]
    pub message_count: Option<u32>,
}

/// Distinct domain keywords in first-seen order, lowercased.
pub(crate) fn extract_topics(messages: &[EventMessage]) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for message in messages {
        for m in topic_regex().find_iter(&message.text) {
            let topic = m.as_str().to_lowercase();
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
    }
    topics
}

pub(crate) fn sentiment(messages: &[EventMessage]) -> &'static str {
    let positive = messages.iter().any(|m| {
        let text = m.text.to_lowercase();
        POSITIVE_MARKERS.iter().any(|marker| text.contains(marker))
    });
    if positive { "positive" } else { "neutral" }
}

fn participants(messages: &[EventMessage]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for message in messages {
        let author = message.author().to_string();
        if !names.contains(&author) {
            names.push(author);
        }
    }
    names
}

fn empty_summary() -> serde_json::Value {
    serde_json::json!({
        "summary": "No messages yet",
        "messageCount": 0,
        "topics": [],
        "participants": [],
        "sentiment": "neutral",
    })
}

pub struct SummarizeChatTool {
    messages: Arc<dyn MessageStore>,
}

impl SummarizeChatTool {
    pub fn new(messages: Arc<dyn MessageStore>) -> Self {
        Self { messages }
    }
}

#[async_trait]
impl SchemaTool for SummarizeChatTool {
    type Args = SummarizeChatArgs;
    const NAME: &'static str = "summarizeChat";
    const DESCRIPTION: &'static str = "Summarize the recent event chat: who is talking, which planning topics \
        come up and the overall mood. Use this to catch up on the discussion.";

    async fn handle(
        &self,
        args: SummarizeChatArgs,
        context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        let event_id = args
            .event_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| context.event_id().to_string());
        let count = args
            .message_count
            .map(|c| c as usize)
            .unwrap_or(DEFAULT_MESSAGE_COUNT);

        let all = self
            .messages
            .get_event_messages(&event_id)
            .await
            .map_err(|e| ToolError::store(e.to_string()))?;

        let recent = &all[all.len().saturating_sub(count)..];
        if recent.is_empty() {
            return Ok(empty_summary());
        }

        let summary = recent
            .iter()
            .map(|m| format!("{}: {}", m.author(), m.text))
            .collect::<Vec<_>>()
            .join(" | ");

        Ok(serde_json::json!({
            "eventId": event_id,
            "summary": summary,
            "messageCount": recent.len(),
            "topics": extract_topics(recent),
            "participants": participants(recent),
            "sentiment": sentiment(recent),
        }))
    }
}
