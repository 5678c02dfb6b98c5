//! EventSource job transport backed by `eventsource-client`.

use async_trait::async_trait;
use es::Client as _;
use eventsource_client as es;
use futures::StreamExt;
use tracing::{debug, info};

use crate::client::endpoints;
use crate::error::StreamError;
use crate::traits::{JobTransport, PayloadStream};

/// Job transport speaking the SSE protocol.
///
/// Reconnection is disabled: a dropped connection must reach the session
/// as a transport error so that it can decide between interruption and a
/// benign late close.
#[derive(Debug, Clone)]
pub struct EventSourceTransport {
    base_url: String,
}

impl EventSourceTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl JobTransport for EventSourceTransport {
    async fn open(&self, job_id: &str) -> Result<PayloadStream, StreamError> {
        let url = endpoints::events(&self.base_url, job_id);
        let client = es::ClientBuilder::for_url(&url)
            .map_err(|e| StreamError::OpenFailed {
                message: format!("{:?}", e),
            })?
            .header("Accept", "text/event-stream")
            .map_err(|e| StreamError::OpenFailed {
                message: format!("{:?}", e),
            })?
            .reconnect(es::ReconnectOptions::reconnect(false).build())
            .build();
        info!("Opening EventSource {}", url);

        let events = client.stream().filter_map(|item| async move {
            match item {
                Ok(es::SSE::Event(event)) => {
                    debug!("SSE event '{}'", event.event_type);
                    Some(Ok(event.data))
                }
                Ok(_) => None,
                Err(e) => Some(Err(StreamError::ConnectionLost {
                    message: format!("{:?}", e),
                })),
            }
        });

        Ok(Box::pin(events))
    }

    fn name(&self) -> &'static str {
        "eventsource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails_to_open() {
        let transport = EventSourceTransport::new("not a url");
        let err = transport.open("job-1").await.err().unwrap();
        assert!(matches!(err, StreamError::OpenFailed { .. }));
    }

    #[test]
    fn test_name() {
        assert_eq!(EventSourceTransport::new("http://localhost:8080").name(), "eventsource");
    }
}
