use serde::{Deserialize, Serialize};

/// Text of the spinner placeholder shown while the answer is pending.
pub const PLACEHOLDER_TEXT: &str = "AI is thinking...";
/// Assistant notice appended when the stream deadline passes.
pub const TIMEOUT_TEXT: &str = "Timed out waiting for response from backend.";
/// Assistant notice appended when the transport drops before any answer arrived.
pub const INTERRUPTION_TEXT: &str = "AI response interrupted or connection lost before completion.";
/// Prefix of the inline error shown when a job could not be created.
pub const SUBMISSION_ERROR_PREFIX: &str = "Error: Could not start job.";

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// What an entry represents beyond its role.
///
/// Notices are generated locally and may be stripped again when a late
/// success arrives; messages come from the user or the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Message,
    Placeholder,
    Prompt,
    TimeoutNotice,
    InterruptionNotice,
    SubmissionError,
}

/// One rendered line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// Spinner placeholder
    pub pending: bool,
    /// Still accumulating answer chunks
    pub streaming: bool,
    pub kind: EntryKind,
}

impl TranscriptEntry {
    fn new(role: Role, text: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            role,
            text: text.into(),
            pending: false,
            streaming: false,
            kind,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, EntryKind::Message)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text, EntryKind::Message)
    }

    pub fn placeholder() -> Self {
        Self {
            pending: true,
            ..Self::new(Role::Assistant, PLACEHOLDER_TEXT, EntryKind::Placeholder)
        }
    }

    /// First chunk of a growing assistant answer.
    pub fn streaming_answer(text: impl Into<String>) -> Self {
        Self {
            streaming: true,
            ..Self::new(Role::Assistant, text, EntryKind::Message)
        }
    }

    /// The prompt the backend constructed. Stored without any display prefix.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(Role::System, text, EntryKind::Prompt)
    }

    pub fn timeout_notice() -> Self {
        Self::new(Role::Assistant, TIMEOUT_TEXT, EntryKind::TimeoutNotice)
    }

    pub fn interruption_notice() -> Self {
        Self::new(Role::Assistant, INTERRUPTION_TEXT, EntryKind::InterruptionNotice)
    }

    pub fn submission_error(reason: impl AsRef<str>) -> Self {
        Self::new(
            Role::Assistant,
            format!("{} {}", SUBMISSION_ERROR_PREFIX, reason.as_ref()),
            EntryKind::SubmissionError,
        )
    }

    /// Pending or streaming. At most one such entry exists in a session.
    pub fn is_active(&self) -> bool {
        self.pending || self.streaming
    }

    /// Timeout or interruption notice that a later success must remove.
    pub fn is_failure_notice(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::TimeoutNotice | EntryKind::InterruptionNotice
        )
    }
}
