//! Job event stream transport abstraction.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::StreamError;

/// Sequence of raw payloads delivered for one job.
///
/// Each item is one line or event body as the server sent it, framing
/// prefix (if any) still attached. The stream ending is a transport close.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

/// Opens the server-to-client stream for a job.
///
/// Implementations own no session state; dropping the returned stream
/// closes the underlying connection.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Open the event stream for `job_id`.
    async fn open(&self, job_id: &str) -> Result<PayloadStream, StreamError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
