use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::JobSessionState;

/// Publishes snapshots until closed.
///
/// Closing takes the sender under the same lock that publishing holds, so
/// no snapshot can be delivered once `close` has returned.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotPublisher {
    sender: Arc<Mutex<Option<watch::Sender<JobSessionState>>>>,
}

impl SnapshotPublisher {
    pub(crate) fn new(initial: JobSessionState) -> (Self, watch::Receiver<JobSessionState>) {
        let (tx, rx) = watch::channel(initial);
        let publisher = Self {
            sender: Arc::new(Mutex::new(Some(tx))),
        };
        (publisher, rx)
    }

    fn lock(&self) -> MutexGuard<'_, Option<watch::Sender<JobSessionState>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false once closed.
    pub(crate) fn publish(&self, state: &JobSessionState) -> bool {
        match self.lock().as_ref() {
            Some(tx) => {
                tx.send_replace(state.clone());
                true
            }
            None => false,
        }
    }

    pub(crate) fn close(&self) {
        self.lock().take();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().is_none()
    }
}

/// Owner's handle on a running [`StreamSession`](super::StreamSession).
///
/// Dropping the handle disposes the session.
#[derive(Debug)]
pub struct SessionHandle {
    job_id: String,
    task: Option<JoinHandle<JobSessionState>>,
    snapshots: watch::Receiver<JobSessionState>,
    publisher: SnapshotPublisher,
}

impl SessionHandle {
    pub(crate) fn new(
        job_id: String,
        task: JoinHandle<JobSessionState>,
        snapshots: watch::Receiver<JobSessionState>,
        publisher: SnapshotPublisher,
    ) -> Self {
        Self {
            job_id,
            task: Some(task),
            snapshots,
            publisher,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// A receiver that observes every published snapshot.
    pub fn snapshots(&self) -> watch::Receiver<JobSessionState> {
        self.snapshots.clone()
    }

    /// The latest published snapshot.
    pub fn current(&self) -> JobSessionState {
        self.snapshots.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait until the published state is settled or publishing stops.
    pub async fn settled(&self) -> JobSessionState {
        let mut rx = self.snapshots.clone();
        loop {
            if rx.borrow_and_update().is_settled() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        let state = rx.borrow().clone();
        state
    }

    /// Stop the session now.
    ///
    /// Publishing stops before this returns; the transport and the timer
    /// are dropped with the aborted task.
    pub fn dispose(&mut self) {
        self.publisher.close();
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(job_id = %self.job_id, "Session disposed");
        }
    }

    /// Wait for the session task to finish and return its final state.
    ///
    /// `None` if the session was disposed or its task panicked.
    pub async fn join(&mut self) -> Option<JobSessionState> {
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
