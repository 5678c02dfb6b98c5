//! Stream session: one transport connection for one job.
//!
//! The session opens the transport, routes every payload through the frame
//! parser and the reducer, applies the resulting intents and only then
//! publishes the new snapshot. Nothing that goes wrong on the stream is
//! returned as an error; it all ends up as a phase of the published state.

mod handle;
mod timer;

pub use handle::SessionHandle;
pub use timer::SessionTimer;

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use handle::SnapshotPublisher;

use crate::error::StreamError;
use crate::sse::parse_payload;
use crate::state::{reduce, Intent, JobSessionState, SessionEvent};
use crate::traits::{JobTransport, PayloadStream};

/// Default time allowed between streaming start and a terminal frame.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(185);

enum Step {
    Payload(String),
    Failed(StreamError),
    Ended,
    TimedOut,
}

/// Drives one job stream to a settled state.
pub struct StreamSession {
    id: Uuid,
    transport: Arc<dyn JobTransport>,
    state: JobSessionState,
    timer: SessionTimer,
    stream: Option<PayloadStream>,
    publisher: SnapshotPublisher,
}

impl StreamSession {
    /// Start a session for `state.job_id` on the current tokio runtime.
    ///
    /// `state` is normally [`JobSessionState::new`] or the result of
    /// [`retry`](crate::state::retry); it is published as the first
    /// snapshot before the transport is opened.
    pub fn spawn(
        transport: Arc<dyn JobTransport>,
        state: JobSessionState,
        timeout: Duration,
    ) -> SessionHandle {
        let job_id = state.job_id.clone();
        let (publisher, snapshots) = SnapshotPublisher::new(state.clone());
        let session = Self {
            id: Uuid::new_v4(),
            transport,
            state,
            timer: SessionTimer::new(timeout),
            stream: None,
            publisher: publisher.clone(),
        };
        let task = tokio::spawn(session.run());
        SessionHandle::new(job_id, task, snapshots, publisher)
    }

    async fn run(mut self) -> JobSessionState {
        let span = info_span!(
            "stream_session",
            job_id = %self.state.job_id,
            attempt = self.state.retry_count,
            session = %self.id,
        );
        async move {
            self.open().await;

            while !self.publisher.is_closed() {
                let step = match self.next_step().await {
                    Some(step) => step,
                    None => break,
                };
                match step {
                    Step::Payload(payload) => {
                        for frame in parse_payload(&payload) {
                            debug!("Frame: {}", frame.frame_type_name());
                            self.dispatch(SessionEvent::Frame(frame));
                            if self.state.is_settled() {
                                break;
                            }
                        }
                    }
                    Step::Failed(err) => self.dispatch(SessionEvent::TransportError {
                        message: err.to_string(),
                    }),
                    Step::Ended => self.dispatch(SessionEvent::TransportClosed),
                    Step::TimedOut => self.dispatch(SessionEvent::TimeoutElapsed),
                }
            }

            self.publisher.close();
            info!(phase = %self.state.phase, "Session ended");
            self.state
        }
        .instrument(span)
        .await
    }

    /// Open the transport, bounded by the stream timeout.
    async fn open(&mut self) {
        let job_id = self.state.job_id.clone();
        debug!(transport = self.transport.name(), "Opening job stream");

        let opened = tokio::time::timeout(self.timer.timeout(), self.transport.open(&job_id)).await;
        match opened {
            Ok(Ok(stream)) => {
                self.stream = Some(stream);
                self.dispatch(SessionEvent::Opened);
            }
            Ok(Err(err)) => self.dispatch(SessionEvent::OpenFailed {
                message: err.to_string(),
            }),
            Err(_) => self.dispatch(SessionEvent::OpenFailed {
                message: StreamError::Timeout {
                    duration_secs: self.timer.timeout().as_secs(),
                }
                .to_string(),
            }),
        }
    }

    /// Next thing that happens to the session, or `None` once the transport
    /// is gone.
    async fn next_step(&mut self) -> Option<Step> {
        let stream = self.stream.as_mut()?;
        // Deadline first: a stream that is always ready must not starve it.
        let step = tokio::select! {
            biased;
            _ = self.timer.expired() => Step::TimedOut,
            item = stream.next() => match item {
                Some(Ok(payload)) => Step::Payload(payload),
                Some(Err(err)) => Step::Failed(err),
                None => Step::Ended,
            },
        };
        Some(step)
    }

    /// Reduce, apply intents, then publish.
    fn dispatch(&mut self, event: SessionEvent) {
        let (state, intents) = reduce(std::mem::take(&mut self.state), event);
        self.state = state;

        for intent in intents {
            self.apply(intent);
        }
        self.publisher.publish(&self.state);
    }

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::StartTimeout => {
                self.timer.arm();
                debug!(timeout_secs = self.timer.timeout().as_secs(), "Timer armed");
            }
            Intent::CancelTimeout => {
                self.timer.disarm();
                debug!("Timer disarmed");
            }
            Intent::CloseTransport => {
                if self.stream.take().is_some() {
                    debug!("Transport closed");
                }
            }
        }
    }
}
