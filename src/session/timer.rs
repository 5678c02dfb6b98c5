use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Stream deadline owned by one session.
///
/// Armed when the session starts streaming, disarmed on a terminal frame or
/// transport loss. Runs on tokio's clock so paused-time tests can advance it.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl SessionTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.timeout);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves at the deadline; never resolves while disarmed.
    pub fn expired(&self) -> impl Future<Output = ()> {
        let deadline = self.deadline;
        async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        }
    }
}
