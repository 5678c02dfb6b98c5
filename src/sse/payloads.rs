//! Structured job status payload.
//!
//! Every field is kept as a loose JSON value so that an unexpected type on
//! one field never hides the others.

use serde::Deserialize;
use serde_json::Value;

/// Status object sent on the events endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct JobEventPayload {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default, rename = "statusMessage")]
    pub status_message: Option<Value>,
    /// Older backends use snake_case
    #[serde(default, rename = "status_message")]
    pub status_message_snake: Option<Value>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub complete: Option<Value>,
    #[serde(default)]
    pub failed: Option<Value>,
    /// Job lookup failures ("Job not found: ...")
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub prompt: Option<Value>,
    /// Nested result object (`answer`, `text`, `prompt`)
    #[serde(default)]
    pub response: Option<Value>,
}

impl JobEventPayload {
    /// Non-empty string field of the nested `response` object.
    pub fn response_text(&self, key: &str) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|r| r.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Non-empty string value, if any.
pub(crate) fn text_of(value: &Option<Value>) -> Option<&str> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub(crate) fn is_true(value: &Option<Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}
