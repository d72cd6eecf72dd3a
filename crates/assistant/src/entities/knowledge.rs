//! Static company and product facts that ground every answer.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{AssistantError, AssistantResult};

const EMBEDDED_KNOWLEDGE: &str = include_str!("../../knowledge/vercup.json");

/// Read-only JSON object loaded once at startup and shared by every session.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeDocument {
    facts: Map<String, Value>,
}

impl KnowledgeDocument {
    pub fn from_json_str(raw: &str) -> AssistantResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|error| AssistantError::knowledge(format!("invalid JSON: {error}")))?;

        match value {
            Value::Object(facts) => Ok(Self { facts }),
            other => Err(AssistantError::knowledge(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> AssistantResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|error| {
            AssistantError::knowledge(format!("failed to read {}: {error}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded knowledge document");
        Self::from_json_str(&raw)
    }

    /// The document bundled with the crate, used when no file is configured.
    pub fn embedded() -> AssistantResult<Self> {
        Self::from_json_str(EMBEDDED_KNOWLEDGE)
    }

    pub fn facts(&self) -> &Map<String, Value> {
        &self.facts
    }

    /// Pretty-printed JSON. Keys come out sorted, so the text only depends on the content.
    pub fn to_prompt_json(&self) -> String {
        let sorted = sort_keys(&Value::Object(self.facts.clone()));
        serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| sorted.to_string())
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
