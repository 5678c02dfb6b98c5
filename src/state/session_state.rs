use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::models::{EntryKind, Role, TranscriptEntry};

/// Status log line when the stream could not be opened.
pub const CONNECTION_FAILED_STATUS: &str = "SSE connection failed.";
/// Status log line when an open stream drops.
pub const CONNECTION_LOST_STATUS: &str = "SSE connection lost.";
/// Prefix of the status log line for an undecodable payload.
pub const MALFORMED_STATUS_PREFIX: &str = "Malformed SSE message: ";
/// Status log line recorded when the user retries.
pub const RETRYING_STATUS: &str = "Retrying SSE connection...";

/// Everything known about one stream session.
///
/// Snapshots of this struct are what observers receive. It is only ever
/// changed by [`reduce`](super::reduce).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSessionState {
    pub job_id: String,
    pub phase: Phase,
    pub transcript: Vec<TranscriptEntry>,
    /// Deduplicated against the immediately preceding entry only
    pub status_log: Vec<String>,
    pub progress: Option<u8>,
    pub answer_received: bool,
    pub retry_count: u32,
    /// Most recent prompt disclosed by the backend
    pub last_prompt: Option<String>,
    /// Prompt texts already shown for this job
    pub disclosed_prompts: Vec<String>,
    /// Transport closed after an answer arrived without a terminal frame
    pub closed: bool,
}

impl JobSessionState {
    /// Start a session for `job_id` on top of the existing conversation.
    ///
    /// Leftover spinners from `history` are dropped and any half-streamed
    /// entry is frozen, then a fresh placeholder is appended.
    pub fn new(job_id: impl Into<String>, history: Vec<TranscriptEntry>) -> Self {
        let mut state = Self {
            job_id: job_id.into(),
            transcript: history,
            ..Self::default()
        };
        state.remove_pending();
        state.finalize_streaming();
        state.transcript.push(TranscriptEntry::placeholder());
        state
    }

    /// No further event can change this state.
    pub fn is_settled(&self) -> bool {
        self.phase.is_terminal() || self.closed
    }

    /// Append to the status log unless it repeats the last line.
    pub fn push_status(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.status_log.last() == Some(&text) {
            return false;
        }
        self.status_log.push(text);
        true
    }

    /// The entry currently accumulating answer chunks.
    pub fn streaming_entry_mut(&mut self) -> Option<&mut TranscriptEntry> {
        self.transcript
            .iter_mut()
            .rev()
            .find(|e| e.streaming && e.role == Role::Assistant)
    }

    /// The pending or streaming entry, if any.
    pub fn active_entry(&self) -> Option<&TranscriptEntry> {
        self.transcript.iter().rev().find(|e| e.is_active())
    }

    pub fn remove_pending(&mut self) {
        self.transcript.retain(|e| !e.pending);
    }

    pub fn finalize_streaming(&mut self) {
        for entry in self.transcript.iter_mut().filter(|e| e.streaming) {
            entry.streaming = false;
        }
    }

    /// Drop timeout and interruption notices left by earlier attempts.
    pub fn strip_failure_notices(&mut self) {
        self.transcript.retain(|e| !e.is_failure_notice());
    }

    /// Text of the last assistant answer entry.
    pub fn answer_text(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|e| e.role == Role::Assistant && e.kind == EntryKind::Message)
            .map(|e| e.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_TEXT;

    #[test]
    fn test_new_appends_placeholder() {
        let state = JobSessionState::new("job-1", vec![TranscriptEntry::user("hi")]);
        assert_eq!(state.phase, Phase::Submitting);
        assert_eq!(state.transcript.len(), 2);
        let last = &state.transcript[1];
        assert!(last.pending);
        assert_eq!(last.text, PLACEHOLDER_TEXT);
        assert!(!state.answer_received);
        assert_eq!(state.retry_count, 0);
    }

    #[test]
    fn test_new_sanitizes_history() {
        let history = vec![
            TranscriptEntry::user("first"),
            TranscriptEntry::streaming_answer("partial"),
            TranscriptEntry::placeholder(),
        ];
        let state = JobSessionState::new("job-2", history);
        let active: Vec<_> = state.transcript.iter().filter(|e| e.is_active()).collect();
        assert_eq!(active.len(), 1);
        assert!(active[0].pending);
        assert_eq!(state.transcript[1].text, "partial");
        assert!(!state.transcript[1].streaming);
    }

    #[test]
    fn test_push_status_dedups_predecessor_only() {
        let mut state = JobSessionState::default();
        assert!(state.push_status("a"));
        assert!(!state.push_status("a"));
        assert!(state.push_status("b"));
        assert!(state.push_status("a"));
        assert_eq!(state.status_log, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_strip_failure_notices() {
        let mut state = JobSessionState::default();
        state.transcript = vec![
            TranscriptEntry::user("q"),
            TranscriptEntry::timeout_notice(),
            TranscriptEntry::interruption_notice(),
            TranscriptEntry::assistant("a"),
        ];
        state.strip_failure_notices();
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.answer_text(), Some("a"));
    }
}
