//! Line-oriented printer for [`TranscriptView`].
//!
//! The terminal cannot take text back, so the renderer remembers what it
//! has printed and only writes the difference: new entries, the growing
//! tail of a streaming answer, new status lines and progress changes.
//! Pending placeholders are never printed.

use std::io::{self, Write};

use crate::models::Role;
use crate::view::{ConfigPanelView, ConnectionInfo, EntryView, TranscriptView};

/// Width of the progress bar in cells.
const BAR_WIDTH: usize = 20;

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "you> ",
        Role::Assistant => "assistant> ",
        Role::System => "system> ",
    }
}

/// Text printed for an entry; long prompts collapse to their preview.
fn printed_text(entry: &EntryView) -> &str {
    entry.preview.as_deref().unwrap_or(&entry.text)
}

/// `[#####---------------] 25%`
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

pub fn print_connection_info<W: Write>(out: &mut W, info: &ConnectionInfo) -> io::Result<()> {
    writeln!(
        out,
        "Database plan: {} | Chat model: {} | Embedding model: {}",
        info.database_plan, info.chat_model, info.embedding_model
    )
}

pub fn print_config_panel<W: Write>(out: &mut W, panel: &ConfigPanelView) -> io::Result<()> {
    writeln!(out, "App version:    {}", panel.app_version)?;
    writeln!(out, "Client version: {}", panel.client_version)?;
    writeln!(out, "Last prompt:    {}", panel.last_prompt)?;
    for (key, value) in &panel.entries {
        writeln!(out, "  {} = {}", key, value)?;
    }
    Ok(())
}

/// Incremental printer; one per terminal.
#[derive(Debug, Default)]
pub struct Renderer {
    shown: Vec<EntryView>,
    job_id: Option<String>,
    statuses: usize,
    progress: Option<u8>,
    retry_hint: bool,
    /// A streaming answer is mid-line
    line_open: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print whatever changed since the previous call.
    pub fn render<W: Write>(&mut self, view: &TranscriptView, out: &mut W) -> io::Result<()> {
        if view.job_id != self.job_id {
            self.job_id = view.job_id.clone();
            self.statuses = 0;
            self.progress = None;
            self.retry_hint = false;
        }
        if view.status_log.len() < self.statuses {
            self.statuses = 0;
        }

        for status in &view.status_log[self.statuses..] {
            self.close_line(out)?;
            writeln!(out, "  [status] {}", status)?;
        }
        self.statuses = view.status_log.len();

        if view.show_progress_bar && view.progress != self.progress {
            if let Some(percent) = view.progress {
                self.close_line(out)?;
                writeln!(out, "  {}", progress_bar(percent))?;
            }
        }
        self.progress = view.progress;

        self.render_entries(view, out)?;

        if view.show_retry && !self.retry_hint {
            self.close_line(out)?;
            writeln!(out, "  (type /retry to reconnect)")?;
        }
        self.retry_hint = view.show_retry;

        out.flush()
    }

    fn render_entries<W: Write>(&mut self, view: &TranscriptView, out: &mut W) -> io::Result<()> {
        let current: Vec<EntryView> = view
            .entries
            .iter()
            .filter(|entry| !entry.pending)
            .cloned()
            .collect();

        let unchanged = self
            .shown
            .iter()
            .zip(&current)
            .take_while(|(shown, now)| shown == now)
            .count();

        for (index, entry) in current.iter().enumerate().skip(unchanged) {
            let continued = self.shown.get(index).filter(|prev| {
                index == unchanged
                    && prev.streaming
                    && prev.role == entry.role
                    && entry.text.starts_with(prev.text.as_str())
            });

            match continued {
                Some(prev) if self.line_open => {
                    write!(out, "{}", &entry.text[prev.text.len()..])?;
                }
                Some(prev) => {
                    write!(out, "{}{}", label(entry.role), &entry.text[prev.text.len()..])?;
                }
                None => {
                    self.close_line(out)?;
                    write!(out, "{}{}", label(entry.role), printed_text(entry))?;
                }
            }

            if entry.streaming {
                self.line_open = true;
            } else {
                writeln!(out)?;
                self.line_open = false;
            }
        }

        self.shown = current;
        Ok(())
    }

    fn close_line<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.line_open {
            writeln!(out)?;
            self.line_open = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranscriptEntry;
    use crate::sse::StreamFrame;
    use crate::state::{reduce, JobSessionState, SessionEvent};
    use crate::view::{project, AppMetadata};

    fn render_all(renderer: &mut Renderer, states: &[JobSessionState]) -> String {
        let mut out = Vec::new();
        for state in states {
            renderer
                .render(&project(state, &AppMetadata::default()), &mut out)
                .unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    fn apply(state: &JobSessionState, event: SessionEvent) -> JobSessionState {
        reduce(state.clone(), event).0
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}] 0%", "-".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}] 50%", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn test_streaming_answer_printed_incrementally() {
        let start = JobSessionState::new("job-1", vec![TranscriptEntry::user("q")]);
        let opened = apply(&start, SessionEvent::Opened);
        let status = apply(
            &opened,
            SessionEvent::Frame(StreamFrame::status("retrieving")),
        );
        let first = apply(&status, SessionEvent::Frame(StreamFrame::chunk("The answer")));
        let second = apply(&first, SessionEvent::Frame(StreamFrame::chunk(" is 42.")));
        let done = apply(&second, SessionEvent::Frame(StreamFrame::completed()));

        let mut renderer = Renderer::new();
        let printed = render_all(&mut renderer, &[start, opened, status, first, second, done]);

        assert_eq!(
            printed,
            "you> q\n  [status] retrieving\nassistant> The answer is 42.\n"
        );
    }

    #[test]
    fn test_timeout_prints_notice_and_hint_once() {
        let start = JobSessionState::new("job-1", vec![TranscriptEntry::user("q")]);
        let opened = apply(&start, SessionEvent::Opened);
        let timed_out = apply(&opened, SessionEvent::TimeoutElapsed);

        let mut renderer = Renderer::new();
        let printed = render_all(&mut renderer, &[start, opened, timed_out.clone(), timed_out]);

        assert_eq!(
            printed,
            "you> q\n\
             \x20 [status] Timed out waiting for response from backend.\n\
             assistant> Timed out waiting for response from backend.\n\
             \x20 (type /retry to reconnect)\n"
        );
    }

    #[test]
    fn test_progress_shown_on_change() {
        let start = JobSessionState::new("job-1", Vec::new());
        let opened = apply(&start, SessionEvent::Opened);
        let half = apply(&opened, SessionEvent::Frame(StreamFrame::ProgressUpdate { percent: 50 }));

        let mut renderer = Renderer::new();
        let printed = render_all(&mut renderer, &[opened, half.clone(), half]);
        assert_eq!(printed.matches("50%").count(), 1);
    }

    #[test]
    fn test_long_prompt_printed_as_preview() {
        let start = JobSessionState::new("job-1", Vec::new());
        let prompt = "p".repeat(120);
        let disclosed = apply(
            &start,
            SessionEvent::Frame(StreamFrame::prompt(prompt.clone())),
        );

        let mut renderer = Renderer::new();
        let printed = render_all(&mut renderer, &[disclosed]);
        assert_eq!(
            printed,
            format!("system> Prompt sent to LLM: {}...\n", "p".repeat(80))
        );
    }
}
