//! Frame types produced by the payload parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a job ended, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalOutcome {
    Completed,
    Failed,
}

impl fmt::Display for TerminalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalOutcome::Completed => write!(f, "COMPLETED"),
            TerminalOutcome::Failed => write!(f, "FAILED"),
        }
    }
}

/// One semantically classified unit extracted from a stream payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Human-readable progress note
    StatusUpdate { text: String },
    /// Completion percentage, 0..=100
    ProgressUpdate { percent: u8 },
    /// The prompt the backend built for the model
    PromptDisclosure { text: String },
    /// One increment of the answer (or the whole answer)
    AnswerChunk { text: String },
    /// Backend finished the job
    Terminal { outcome: TerminalOutcome },
    /// Looked structured but could not be decoded
    Malformed { raw: String },
}

impl StreamFrame {
    /// Returns the frame type name for logging.
    pub fn frame_type_name(&self) -> &'static str {
        match self {
            StreamFrame::StatusUpdate { .. } => "status_update",
            StreamFrame::ProgressUpdate { .. } => "progress_update",
            StreamFrame::PromptDisclosure { .. } => "prompt_disclosure",
            StreamFrame::AnswerChunk { .. } => "answer_chunk",
            StreamFrame::Terminal { .. } => "terminal",
            StreamFrame::Malformed { .. } => "malformed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::Terminal { .. })
    }

    pub fn status(text: impl Into<String>) -> Self {
        StreamFrame::StatusUpdate { text: text.into() }
    }

    pub fn chunk(text: impl Into<String>) -> Self {
        StreamFrame::AnswerChunk { text: text.into() }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        StreamFrame::PromptDisclosure { text: text.into() }
    }

    pub fn completed() -> Self {
        StreamFrame::Terminal {
            outcome: TerminalOutcome::Completed,
        }
    }

    pub fn failed() -> Self {
        StreamFrame::Terminal {
            outcome: TerminalOutcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_type_name() {
        assert_eq!(StreamFrame::status("x").frame_type_name(), "status_update");
        assert_eq!(StreamFrame::chunk("x").frame_type_name(), "answer_chunk");
        assert_eq!(StreamFrame::completed().frame_type_name(), "terminal");
        assert_eq!(
            StreamFrame::ProgressUpdate { percent: 3 }.frame_type_name(),
            "progress_update"
        );
    }

    #[test]
    fn test_is_terminal() {
        assert!(StreamFrame::failed().is_terminal());
        assert!(!StreamFrame::Malformed { raw: "{".into() }.is_terminal());
    }

    #[test]
    fn test_frame_serializes_tagged() {
        let json = serde_json::to_string(&StreamFrame::completed()).unwrap();
        assert_eq!(json, r#"{"type":"terminal","outcome":"COMPLETED"}"#);
    }
}
