//! Common test utilities for integration tests.
//!
//! Fixtures for driving stream sessions against scripted transports and
//! for pointing a real client at a `wiremock` server.

#![allow(dead_code)]

pub use ragchat::adapters::mock::{
    MockHttpClient, MockResponse, MockScript, MockStep, MockTransport,
};

use std::sync::Arc;
use std::time::Duration;

use ragchat::config::{ClientConfig, TransportKind};
use ragchat::models::TranscriptEntry;
use ragchat::session::{SessionHandle, StreamSession};
use ragchat::state::JobSessionState;

/// Stream timeout used by tests that do not exercise the deadline.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of an SSE response carrying one `data:` payload per event.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data:{}\n\n", payload))
        .collect()
}

/// A fresh state for `job_id` after a single user question.
pub fn new_state(job_id: &str, question: &str) -> JobSessionState {
    JobSessionState::new(job_id, vec![TranscriptEntry::user(question)])
}

/// Start a session on `transport` for a fresh job.
pub fn spawn_session(transport: &Arc<MockTransport>, job_id: &str) -> SessionHandle {
    StreamSession::spawn(
        Arc::clone(transport) as Arc<dyn ragchat::traits::JobTransport>,
        new_state(job_id, "What is 6x7?"),
        TEST_TIMEOUT,
    )
}

/// Client configuration pointing at a test server.
pub fn config_for(base_url: &str, transport: TransportKind) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(base_url)
        .with_transport(transport)
        .with_stream_timeout(TEST_TIMEOUT)
        .with_connect_timeout(Duration::from_secs(2))
}

/// Texts of all assistant entries, in order.
pub fn assistant_texts(state: &JobSessionState) -> Vec<String> {
    state
        .transcript
        .iter()
        .filter(|entry| entry.role == ragchat::models::Role::Assistant)
        .map(|entry| entry.text.clone())
        .collect()
}
