//! Scripted job transport for testing.
//!
//! Each `open` consumes the next queued [`MockScript`]. Streams handed out
//! are wrapped so that dropping them is counted as a transport close.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::traits::{JobTransport, PayloadStream};

/// One scripted step of a mock stream.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Deliver a payload
    Payload(String),
    /// Fail the stream with a connection error
    Error(String),
    /// Wait before the next step
    Delay(Duration),
}

impl MockStep {
    pub fn payload(text: impl Into<String>) -> Self {
        MockStep::Payload(text.into())
    }
}

/// What the next `open` does.
#[derive(Debug)]
pub enum MockScript {
    /// Fail to open
    Refuse(String),
    /// Play the steps; then end, or stay open forever when `hang` is set
    Stream { steps: Vec<MockStep>, hang: bool },
    /// Deliver whatever the test sends; ends when the sender is dropped
    Channel(mpsc::UnboundedReceiver<Result<String, StreamError>>),
}

impl MockScript {
    /// Play `steps` and then end the stream.
    pub fn steps(steps: Vec<MockStep>) -> Self {
        MockScript::Stream { steps, hang: false }
    }

    /// Play `payloads` and then end the stream.
    pub fn payloads<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::steps(payloads.into_iter().map(MockStep::payload).collect())
    }

    /// Open and never deliver anything.
    pub fn silent() -> Self {
        MockScript::Stream {
            steps: Vec::new(),
            hang: true,
        }
    }

    /// Script driven by the returned sender.
    pub fn channel() -> (Self, mpsc::UnboundedSender<Result<String, StreamError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MockScript::Channel(rx), tx)
    }
}

/// Counts the stream being dropped.
struct Tracked {
    inner: PayloadStream,
    closes: Arc<AtomicUsize>,
}

impl Stream for Tracked {
    type Item = Result<String, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock transport for session and conversation tests.
///
/// # Example
///
/// ```ignore
/// use ragchat::adapters::mock::{MockScript, MockTransport};
///
/// let transport = MockTransport::new();
/// transport.push(MockScript::payloads([
///     r#"data:{"statusMessage":"retrieving"}"#,
///     "data: The answer is 42.",
///     r#"data:{"status":"COMPLETED"}"#,
/// ]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    opened: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the behavior of the next `open`.
    pub fn push(&self, script: MockScript) {
        lock(&self.scripts).push_back(script);
    }

    pub fn with_script(self, script: MockScript) -> Self {
        self.push(script);
        self
    }

    /// Job ids passed to `open`, in order.
    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }

    /// Number of streams dropped so far.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn play(steps: Vec<MockStep>, hang: bool) -> PayloadStream {
        let played = stream::unfold(steps.into_iter(), |mut steps| async move {
            loop {
                match steps.next()? {
                    MockStep::Delay(duration) => tokio::time::sleep(duration).await,
                    MockStep::Payload(payload) => return Some((Ok(payload), steps)),
                    MockStep::Error(message) => {
                        return Some((Err(StreamError::ConnectionLost { message }), steps))
                    }
                }
            }
        });

        if hang {
            Box::pin(played.chain(stream::pending()))
        } else {
            Box::pin(played)
        }
    }
}

#[async_trait]
impl JobTransport for MockTransport {
    async fn open(&self, job_id: &str) -> Result<PayloadStream, StreamError> {
        lock(&self.opened).push(job_id.to_string());

        let script = lock(&self.scripts).pop_front();
        let inner: PayloadStream = match script {
            Some(MockScript::Refuse(message)) => {
                return Err(StreamError::OpenFailed { message });
            }
            Some(MockScript::Stream { steps, hang }) => Self::play(steps, hang),
            Some(MockScript::Channel(rx)) => Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })),
            None => {
                return Err(StreamError::OpenFailed {
                    message: format!("no mock script for job {}", job_id),
                });
            }
        };

        Ok(Box::pin(Tracked {
            inner,
            closes: Arc::clone(&self.closes),
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_payloads_then_end() {
        let transport = MockTransport::new().with_script(MockScript::payloads(["a", "b"]));
        let stream = transport.open("job-1").await.unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items, vec![Ok("a".to_string()), Ok("b".to_string())]);
        assert_eq!(transport.opened(), vec!["job-1"]);
        assert_eq!(transport.closes(), 1);
    }

    #[tokio::test]
    async fn test_refuse() {
        let transport = MockTransport::new().with_script(MockScript::Refuse("down".into()));
        let err = transport.open("job-1").await.err().unwrap();
        assert_eq!(
            err,
            StreamError::OpenFailed {
                message: "down".to_string()
            }
        );
        assert_eq!(transport.closes(), 0);
    }

    #[tokio::test]
    async fn test_unscripted_open_fails() {
        let transport = MockTransport::new();
        assert!(transport.open("job-1").await.is_err());
    }

    #[tokio::test]
    async fn test_error_step() {
        let transport = MockTransport::new().with_script(MockScript::steps(vec![
            MockStep::payload("x"),
            MockStep::Error("reset".to_string()),
        ]));
        let items: Vec<_> = transport.open("j").await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(StreamError::ConnectionLost { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_step_uses_tokio_time() {
        let transport = MockTransport::new().with_script(MockScript::steps(vec![
            MockStep::Delay(Duration::from_secs(60)),
            MockStep::payload("late"),
        ]));
        let start = tokio::time::Instant::now();
        let items: Vec<_> = transport.open("j").await.unwrap().collect().await;
        assert_eq!(items, vec![Ok("late".to_string())]);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_channel_script() {
        let (script, tx) = MockScript::channel();
        let transport = MockTransport::new().with_script(script);
        let mut stream = transport.open("j").await.unwrap();

        tx.send(Ok("first".to_string())).unwrap();
        assert_eq!(stream.next().await, Some(Ok("first".to_string())));
        drop(tx);
        assert_eq!(stream.next().await, None);
        drop(stream);
        assert_eq!(transport.closes(), 1);
    }
}
