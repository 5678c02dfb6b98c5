//! Transcript projection.
//!
//! Pure functions from session state plus startup metadata to the data a
//! front end renders. Nothing here holds state of its own.

mod metadata;

pub use metadata::{AppMetadata, ConfigPanelView, ConnectionInfo};

use serde::Serialize;

use crate::models::{EntryKind, Role, TranscriptEntry};
use crate::state::{JobSessionState, Phase};

/// Label shown in front of a disclosed prompt.
pub const PROMPT_PREFIX: &str = "Prompt sent to LLM: ";
/// Prompts longer than this are collapsed to a preview.
pub const PROMPT_PREVIEW_CHARS: usize = 80;

/// One renderable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub role: Role,
    pub kind: EntryKind,
    /// Text to display, including any label
    pub text: String,
    pub pending: bool,
    pub streaming: bool,
    /// Collapsed form of a long prompt
    pub preview: Option<String>,
}

impl EntryView {
    fn from_entry(entry: &TranscriptEntry) -> Self {
        let (text, preview) = match entry.kind {
            EntryKind::Prompt => (
                format!("{}{}", PROMPT_PREFIX, entry.text),
                prompt_preview(&entry.text).map(|p| format!("{}{}", PROMPT_PREFIX, p)),
            ),
            _ => (entry.text.clone(), None),
        };
        Self {
            role: entry.role,
            kind: entry.kind,
            text,
            pending: entry.pending,
            streaming: entry.streaming,
            preview,
        }
    }
}

/// Everything a front end needs to draw the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptView {
    pub entries: Vec<EntryView>,
    pub status_log: Vec<String>,
    pub progress: Option<u8>,
    /// Progress is known and strictly between 0 and 100
    pub show_progress_bar: bool,
    pub show_retry: bool,
    pub loading: bool,
    /// `None` when no job has been started
    pub job_id: Option<String>,
    pub phase: Option<Phase>,
    pub retry_count: u32,
    pub last_prompt: Option<String>,
    pub version: Option<String>,
    pub config_panel: Option<ConfigPanelView>,
    pub connection_info: Option<ConnectionInfo>,
}

/// Project a live (or finished) session.
pub fn project(state: &JobSessionState, meta: &AppMetadata) -> TranscriptView {
    let loading = !state.is_settled() && state.active_entry().is_some();
    let mut view = project_transcript(&state.transcript, loading, meta);

    view.status_log = state.status_log.clone();
    view.progress = state.progress;
    view.show_progress_bar = matches!(state.progress, Some(p) if p > 0 && p < 100);
    view.show_retry = state.phase.is_retryable();
    view.job_id = Some(state.job_id.clone());
    view.phase = Some(state.phase);
    view.retry_count = state.retry_count;
    view.last_prompt = state.last_prompt.clone();
    view.config_panel = meta.config_panel(state.last_prompt.as_deref());
    view
}

/// Project a bare transcript with no session behind it.
pub fn project_transcript(
    entries: &[TranscriptEntry],
    loading: bool,
    meta: &AppMetadata,
) -> TranscriptView {
    TranscriptView {
        entries: entries.iter().map(EntryView::from_entry).collect(),
        status_log: Vec::new(),
        progress: None,
        show_progress_bar: false,
        show_retry: false,
        loading,
        job_id: None,
        phase: None,
        retry_count: 0,
        last_prompt: None,
        version: meta.display_version(),
        config_panel: meta.config_panel(None),
        connection_info: meta.connection_info(),
    }
}

/// First [`PROMPT_PREVIEW_CHARS`] characters plus an ellipsis, when the
/// prompt is longer than that.
pub fn prompt_preview(prompt: &str) -> Option<String> {
    if prompt.chars().count() <= PROMPT_PREVIEW_CHARS {
        return None;
    }
    let head: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
    Some(format!("{}...", head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PLACEHOLDER_TEXT;
    use crate::state::{reduce, SessionEvent};
    use crate::sse::StreamFrame;

    fn streaming_state() -> JobSessionState {
        let state = JobSessionState::new("job-1", vec![TranscriptEntry::user("q")]);
        reduce(state, SessionEvent::Opened).0
    }

    #[test]
    fn test_pending_placeholder_is_loading() {
        let view = project(&streaming_state(), &AppMetadata::default());
        assert!(view.loading);
        assert_eq!(view.entries.len(), 2);
        assert!(view.entries[1].pending);
        assert_eq!(view.entries[1].text, PLACEHOLDER_TEXT);
        assert!(!view.show_retry);
        assert_eq!(view.phase, Some(Phase::Streaming));
    }

    #[test]
    fn test_progress_bar_visibility() {
        let mut state = streaming_state();
        for (percent, visible) in [(0, false), (1, true), (99, true), (100, false)] {
            state.progress = Some(percent);
            let view = project(&state, &AppMetadata::default());
            assert_eq!(view.show_progress_bar, visible, "percent {}", percent);
        }
        state.progress = None;
        assert!(!project(&state, &AppMetadata::default()).show_progress_bar);
    }

    #[test]
    fn test_retry_shown_after_timeout() {
        let (state, _) = reduce(streaming_state(), SessionEvent::TimeoutElapsed);
        let view = project(&state, &AppMetadata::default());
        assert!(view.show_retry);
        assert!(!view.loading);
    }

    #[test]
    fn test_completed_not_loading() {
        let (state, _) = reduce(
            streaming_state(),
            SessionEvent::Frame(StreamFrame::completed()),
        );
        let view = project(&state, &AppMetadata::default());
        assert!(!view.loading);
        assert!(!view.show_retry);
        assert_eq!(view.progress, Some(100));
    }

    #[test]
    fn test_prompt_entry_label_and_preview() {
        let long = "x".repeat(100);
        let (state, _) = reduce(
            streaming_state(),
            SessionEvent::Frame(StreamFrame::prompt(long.clone())),
        );
        let view = project(&state, &AppMetadata::default());
        let prompt = view
            .entries
            .iter()
            .find(|e| e.kind == EntryKind::Prompt)
            .unwrap();
        assert_eq!(prompt.text, format!("Prompt sent to LLM: {}", long));
        assert_eq!(
            prompt.preview.as_deref(),
            Some(format!("Prompt sent to LLM: {}...", "x".repeat(80)).as_str())
        );
        assert_eq!(view.last_prompt.as_deref(), Some(long.as_str()));
    }

    #[test]
    fn test_prompt_preview_counts_chars() {
        assert_eq!(prompt_preview("short"), None);
        assert_eq!(prompt_preview(&"a".repeat(80)), None);
        let accented = "\u{e9}".repeat(81);
        assert_eq!(
            prompt_preview(&accented),
            Some(format!("{}...", "\u{e9}".repeat(80)))
        );
    }

    #[test]
    fn test_project_transcript_without_session() {
        let entries = vec![TranscriptEntry::user("q"), TranscriptEntry::assistant("a")];
        let view = project_transcript(&entries, false, &AppMetadata::default());
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.phase, None);
        assert!(view.status_log.is_empty());
        assert!(!view.show_retry);
    }
}
