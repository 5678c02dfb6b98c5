//! Payload classification.

use serde_json::Value;
use tracing::debug;

use super::frames::{StreamFrame, TerminalOutcome};
use super::payloads::{is_true, text_of, JobEventPayload};

/// Transport framing prefix on event stream lines.
pub const DATA_PREFIX: &str = "data:";

/// Strip the `data:` framing prefix.
///
/// Exactly the five prefix bytes are removed. The space that usually
/// follows is kept, since raw answer chunks rely on it to separate words.
pub fn strip_framing(payload: &str) -> &str {
    payload.strip_prefix(DATA_PREFIX).unwrap_or(payload)
}

/// Classify one payload into frames.
///
/// A JSON object yields one frame per recognized field category in the
/// order status, progress, prompt, answer, terminal. An object with no
/// recognized field yields nothing. Anything that does not look like an
/// object is an answer chunk carried verbatim.
pub fn parse_payload(payload: &str) -> Vec<StreamFrame> {
    if payload.trim().is_empty() {
        return Vec::new();
    }

    let body = strip_framing(payload);
    if body.is_empty() {
        return Vec::new();
    }

    let trimmed = body.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => match serde_json::from_value(value) {
                Ok(event) => classify(&event),
                Err(e) => malformed(trimmed, &e),
            },
            Ok(_) => vec![StreamFrame::chunk(body)],
            Err(e) => malformed(trimmed, &e),
        };
    }

    vec![StreamFrame::chunk(body)]
}

fn malformed(raw: &str, err: &serde_json::Error) -> Vec<StreamFrame> {
    debug!("Structured payload failed to decode: {}", err);
    vec![StreamFrame::Malformed {
        raw: raw.to_string(),
    }]
}

fn classify(event: &JobEventPayload) -> Vec<StreamFrame> {
    let mut frames = Vec::new();

    if let Some(text) = text_of(&event.status_message).or_else(|| text_of(&event.status_message_snake))
    {
        frames.push(StreamFrame::status(text));
    }
    let error = text_of(&event.error);
    if let Some(text) = error {
        frames.push(StreamFrame::status(text));
    }

    if let Some(percent) = event.progress.as_ref().and_then(progress_percent) {
        frames.push(StreamFrame::ProgressUpdate { percent });
    }

    if let Some(text) = text_of(&event.prompt).or_else(|| event.response_text("prompt")) {
        frames.push(StreamFrame::prompt(text));
    }

    let answer = text_of(&event.message)
        .or_else(|| event.response_text("answer"))
        .or_else(|| event.response_text("text"))
        .or_else(|| text_of(&event.answer));
    if let Some(text) = answer {
        frames.push(StreamFrame::chunk(text));
    }

    if let Some(outcome) = terminal_outcome(event, error.is_some()) {
        frames.push(StreamFrame::Terminal { outcome });
    }

    frames
}

/// Failure markers outrank completion markers when both are present.
fn terminal_outcome(event: &JobEventPayload, has_error: bool) -> Option<TerminalOutcome> {
    let status = event
        .status
        .as_ref()
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_uppercase());

    if has_error || is_true(&event.failed) || status.as_deref() == Some("FAILED") {
        return Some(TerminalOutcome::Failed);
    }
    if is_true(&event.complete) || matches!(status.as_deref(), Some("COMPLETED" | "COMPLETE")) {
        return Some(TerminalOutcome::Completed);
    }
    None
}

fn progress_percent(value: &Value) -> Option<u8> {
    let raw = value.as_f64()?;
    if raw.is_nan() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}
