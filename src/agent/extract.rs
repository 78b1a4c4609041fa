//! Pulling JSON out of free-text model output.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("valid fence regex")
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    Parsed(Value),
    /// No candidate parsed; holds the last parse failure.
    Malformed(String),
}

impl JsonExtraction {
    pub fn into_result(self, operation: &str) -> Result<Value> {
        match self {
            Self::Parsed(value) => Ok(value),
            Self::Malformed(reason) => Err(Error::malformed(operation, reason)),
        }
    }
}

/// Finds a JSON value in model output.
///
/// Candidates, in order: the whole trimmed text, the first fenced block,
/// then the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> JsonExtraction {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return JsonExtraction::Malformed("empty response".into());
    }

    let mut last_error = "no JSON object found".to_string();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str(trimmed) {
            Ok(value) => return JsonExtraction::Parsed(value),
            Err(e) => last_error = e.to_string(),
        }
    }

    if let Some(inner) = fence_regex()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
    {
        match serde_json::from_str(inner) {
            Ok(value) => return JsonExtraction::Parsed(value),
            Err(e) => last_error = e.to_string(),
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        match serde_json::from_str(&trimmed[start..=end]) {
            Ok(value) => return JsonExtraction::Parsed(value),
            Err(e) => last_error = e.to_string(),
        }
    }

    JsonExtraction::Malformed(last_error)
}

/// Extracts and deserializes model output; failures name `operation`.
pub fn parse_json_as<T: DeserializeOwned>(text: &str, operation: &str) -> Result<T> {
    let value = extract_json(text).into_result(operation)?;
    serde_json::from_value(value).map_err(|e| Error::malformed(operation, e.to_string()))
}
