//! Caroling domain entities read by the tools.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Energy level of a carol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Low,
    Medium,
    High,
}

impl Energy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown energy level: {}", other)),
        }
    }
}

/// A carol in the shared songbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carol {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub energy: Energy,
    /// Running time as `m:ss`, or whole minutes.
    pub duration: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lyrics: Vec<String>,
}

impl Carol {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        energy: Energy,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            energy,
            duration: duration.into(),
            tags: Vec::new(),
            lyrics: Vec::new(),
        }
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn lyrics(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.lyrics = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Duration in seconds. Unparseable durations count as zero.
    pub fn duration_secs(&self) -> u32 {
        parse_duration_secs(&self.duration).unwrap_or(0)
    }

    pub fn has_tag_containing(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Parses `m:ss` or a bare minute count into seconds. Values past `u32`
/// seconds are rejected.
pub(crate) fn parse_duration_secs(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    match raw.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.trim().parse().ok()?;
            let seconds: u32 = seconds.trim().parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => raw.parse::<u32>().ok()?.checked_mul(60),
    }
}

/// Formats seconds as `m:ss`.
pub(crate) fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// A chat message posted to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub id: String,
    pub event_id: String,
    pub member_id: String,
    #[serde(default)]
    pub member_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(
        event_id: impl Into<String>,
        member_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            member_id: member_id.into(),
            member_name: None,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Display name, falling back to the member id.
    pub fn author(&self) -> &str {
        self.member_name.as_deref().unwrap_or(&self.member_id)
    }
}

/// Event the assistant is answering for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub theme: Option<String>,
    /// Chat history; loaded from the message store when empty.
    #[serde(default)]
    pub messages: Vec<EventMessage>,
}

impl EventContext {
    pub fn new(event_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            name: name.into(),
            theme: None,
            messages: Vec::new(),
        }
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn messages(mut self, messages: Vec<EventMessage>) -> Self {
        self.messages = messages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration_secs("2:45"), Some(165));
        assert_eq!(parse_duration_secs(" 3 "), Some(180));
        assert_eq!(parse_duration_secs("0:59"), Some(59));
        assert_eq!(parse_duration_secs("1:75"), None);
        assert_eq!(parse_duration_secs("long"), None);
        assert_eq!(parse_duration_secs("71582789"), None);
        assert_eq!(parse_duration_secs("71582789:00"), None);
        assert_eq!(parse_duration_secs("71582788"), Some(4_294_967_280));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(165), "2:45");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn test_carol_tag_match_is_case_insensitive() {
        let carol = Carol::new("1", "O Holy Night", "Adam", Energy::Low, "3:30")
            .tags(["Religious", "Classic"]);
        assert!(carol.has_tag_containing("relig"));
        assert!(!carol.has_tag_containing("pop"));
        assert_eq!(carol.duration_secs(), 210);
    }

    #[test]
    fn test_energy_from_str() {
        assert_eq!("HIGH".parse::<Energy>(), Ok(Energy::High));
        assert!("loud".parse::<Energy>().is_err());
    }

    #[test]
    fn test_message_author_fallback() {
        let anon = EventMessage::new("e1", "m-7", "hello");
        assert_eq!(anon.author(), "m-7");
        assert_eq!(anon.member_name("Ana").author(), "Ana");
    }
}
