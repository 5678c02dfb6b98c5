//! Session state transitions.
//!
//! `reduce` is the only place a [`JobSessionState`] changes. It performs no
//! I/O; anything the session must do in the outside world comes back as an
//! [`Intent`].

use tracing::{debug, info, warn};

use super::phase::Phase;
use super::session_state::{
    JobSessionState, CONNECTION_FAILED_STATUS, CONNECTION_LOST_STATUS, MALFORMED_STATUS_PREFIX,
    RETRYING_STATUS,
};
use crate::models::{TranscriptEntry, TIMEOUT_TEXT};
use crate::sse::{StreamFrame, TerminalOutcome};

/// Discrete inputs to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The transport reported a successful open
    Opened,
    /// The transport could not be opened
    OpenFailed { message: String },
    /// One parsed frame, in arrival order
    Frame(StreamFrame),
    /// The stream deadline passed
    TimeoutElapsed,
    /// The open transport failed
    TransportError { message: String },
    /// The stream ended without an error
    TransportClosed,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Arm the stream deadline
    StartTimeout,
    /// Disarm the stream deadline
    CancelTimeout,
    /// Drop the transport
    CloseTransport,
}

/// Apply one event.
///
/// Once the state is settled (terminal phase, or closed after a late
/// disconnect) every event is ignored and no intent is produced.
pub fn reduce(state: JobSessionState, event: SessionEvent) -> (JobSessionState, Vec<Intent>) {
    let mut state = state;
    let mut intents = Vec::new();

    if state.is_settled() {
        debug!(
            job_id = %state.job_id,
            phase = %state.phase,
            "Ignoring event after session settled: {:?}",
            event
        );
        return (state, intents);
    }

    match event {
        SessionEvent::Opened => {
            begin_streaming(&mut state, &mut intents);
        }
        SessionEvent::Frame(frame) => {
            begin_streaming(&mut state, &mut intents);
            apply_frame(&mut state, frame, &mut intents);
        }
        SessionEvent::TimeoutElapsed => {
            if state.phase == Phase::Streaming {
                time_out(&mut state, &mut intents);
            }
        }
        SessionEvent::OpenFailed { message } => {
            warn!(job_id = %state.job_id, "Event stream failed to open: {}", message);
            state.push_status(CONNECTION_FAILED_STATUS);
            lose_transport(&mut state, &mut intents);
        }
        SessionEvent::TransportError { message } => {
            warn!(job_id = %state.job_id, "Event stream error: {}", message);
            state.push_status(CONNECTION_LOST_STATUS);
            lose_transport(&mut state, &mut intents);
        }
        SessionEvent::TransportClosed => {
            debug!(job_id = %state.job_id, "Event stream ended before a terminal frame");
            if !state.answer_received {
                state.push_status(CONNECTION_LOST_STATUS);
            }
            lose_transport(&mut state, &mut intents);
        }
    }

    (state, intents)
}

/// Start a fresh session for the same job.
///
/// Only allowed from a retryable phase. The transcript and status log are
/// carried over; the spinner, flags and timer start from scratch.
pub fn retry(state: &JobSessionState) -> Option<JobSessionState> {
    if !state.phase.is_retryable() {
        return None;
    }

    let mut next = JobSessionState::new(state.job_id.clone(), state.transcript.clone());
    next.status_log = state.status_log.clone();
    next.push_status(RETRYING_STATUS);
    next.retry_count = state.retry_count + 1;
    next.last_prompt = state.last_prompt.clone();
    next.disclosed_prompts = state.disclosed_prompts.clone();

    info!(
        job_id = %next.job_id,
        attempt = next.retry_count,
        "Retrying job stream"
    );
    Some(next)
}

fn begin_streaming(state: &mut JobSessionState, intents: &mut Vec<Intent>) {
    if state.phase == Phase::Submitting {
        state.phase = Phase::Streaming;
        intents.push(Intent::StartTimeout);
        debug!(job_id = %state.job_id, "Session streaming");
    }
}

fn apply_frame(state: &mut JobSessionState, frame: StreamFrame, intents: &mut Vec<Intent>) {
    match frame {
        StreamFrame::StatusUpdate { text } => {
            state.push_status(text);
        }
        StreamFrame::ProgressUpdate { percent } => {
            state.progress = Some(percent);
        }
        StreamFrame::PromptDisclosure { text } => {
            if !state.disclosed_prompts.contains(&text) {
                state.transcript.push(TranscriptEntry::prompt(text.clone()));
                state.disclosed_prompts.push(text.clone());
            }
            state.last_prompt = Some(text);
        }
        StreamFrame::AnswerChunk { text } => {
            append_chunk(state, text);
        }
        StreamFrame::Terminal { outcome } => {
            finish(state, outcome, intents);
        }
        StreamFrame::Malformed { raw } => {
            warn!(job_id = %state.job_id, "Malformed stream payload: {}", raw);
            state.push_status(format!("{}{}", MALFORMED_STATUS_PREFIX, raw));
        }
    }
}

fn append_chunk(state: &mut JobSessionState, text: String) {
    state.answer_received = true;
    if let Some(entry) = state.streaming_entry_mut() {
        entry.text.push_str(&text);
        return;
    }
    state.remove_pending();
    state.transcript.push(TranscriptEntry::streaming_answer(text));
}

fn finish(state: &mut JobSessionState, outcome: TerminalOutcome, intents: &mut Vec<Intent>) {
    state.remove_pending();
    state.strip_failure_notices();
    state.finalize_streaming();
    state.progress = Some(100);
    state.answer_received = true;
    state.phase = match outcome {
        TerminalOutcome::Completed => Phase::Completed,
        TerminalOutcome::Failed => Phase::Failed,
    };
    intents.push(Intent::CancelTimeout);
    intents.push(Intent::CloseTransport);
    info!(job_id = %state.job_id, phase = %state.phase, "Job finished");
}

fn time_out(state: &mut JobSessionState, intents: &mut Vec<Intent>) {
    state.remove_pending();
    state.finalize_streaming();
    state.transcript.push(TranscriptEntry::timeout_notice());
    state.push_status(TIMEOUT_TEXT);
    state.phase = Phase::TimedOut;
    intents.push(Intent::CloseTransport);
    warn!(job_id = %state.job_id, "Timed out waiting for a terminal frame");
}

/// Loud before any answer, silent after.
fn lose_transport(state: &mut JobSessionState, intents: &mut Vec<Intent>) {
    intents.push(Intent::CancelTimeout);
    intents.push(Intent::CloseTransport);

    if state.answer_received {
        state.finalize_streaming();
        state.closed = true;
        info!(
            job_id = %state.job_id,
            "Stream closed after answer was delivered"
        );
        return;
    }

    state.remove_pending();
    state.transcript.push(TranscriptEntry::interruption_notice());
    state.phase = Phase::Interrupted;
}
