//! Client configuration.
//!
//! Precedence is command line flags, then `RAGCHAT_*` environment
//! variables, then defaults.

use std::fmt;
use std::time::Duration;
use tracing::warn;

use crate::models::ResponseMode;
use crate::session::DEFAULT_STREAM_TIMEOUT;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_URL: &str = "RAGCHAT_URL";
pub const ENV_STREAM_TIMEOUT: &str = "RAGCHAT_STREAM_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "RAGCHAT_CONNECT_TIMEOUT_SECS";
pub const ENV_TRANSPORT: &str = "RAGCHAT_TRANSPORT";
pub const ENV_MODE: &str = "RAGCHAT_MODE";

/// How the job event stream is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// Plain GET read as a chunked body
    #[default]
    Fetch,
    /// SSE client
    EventSource,
}

impl TransportKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fetch" => Some(TransportKind::Fetch),
            "sse" | "eventsource" => Some(TransportKind::EventSource),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Fetch => "fetch",
            TransportKind::EventSource => "sse",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for talking to the job runner.
///
/// # Example
///
/// ```ignore
/// use ragchat::config::{ClientConfig, TransportKind};
///
/// let config = ClientConfig::from_env()
///     .with_base_url("http://rag.internal:8080")
///     .with_transport(TransportKind::EventSource);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Deadline for a terminal frame once streaming starts
    pub stream_timeout: Duration,
    pub connect_timeout: Duration,
    pub transport: TransportKind,
    pub response_mode: ResponseMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            transport: TransportKind::default(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    /// Defaults overridden by `RAGCHAT_*` variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_URL).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(timeout) = lookup(ENV_STREAM_TIMEOUT).and_then(|v| parse_secs(ENV_STREAM_TIMEOUT, &v)) {
            config.stream_timeout = timeout;
        }
        if let Some(timeout) = lookup(ENV_CONNECT_TIMEOUT).and_then(|v| parse_secs(ENV_CONNECT_TIMEOUT, &v)) {
            config.connect_timeout = timeout;
        }
        if let Some(value) = lookup(ENV_TRANSPORT) {
            match TransportKind::from_name(&value) {
                Some(kind) => config.transport = kind,
                None => warn!("Ignoring {}={:?}: expected fetch or sse", ENV_TRANSPORT, value),
            }
        }
        if let Some(value) = lookup(ENV_MODE) {
            match ResponseMode::from_name(&value) {
                Some(mode) => config.response_mode = mode,
                None => warn!("Ignoring {}={:?}: unknown response mode", ENV_MODE, value),
            }
        }

        config
    }
}

/// Positive whole seconds.
pub fn parse_secs(name: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!("Ignoring {}={:?}: expected a positive number of seconds", name, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.stream_timeout, Duration::from_secs(185));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.transport, TransportKind::Fetch);
        assert_eq!(config.response_mode, ResponseMode::RagOnly);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_base_url("http://rag:9000/")
            .with_stream_timeout(Duration::from_secs(30))
            .with_transport(TransportKind::EventSource)
            .with_response_mode(ResponseMode::PureLlm);
        assert_eq!(config.base_url, "http://rag:9000");
        assert_eq!(config.stream_timeout, Duration::from_secs(30));
        assert_eq!(config.transport, TransportKind::EventSource);
        assert_eq!(config.response_mode, ResponseMode::PureLlm);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_URL, "http://backend:8080"),
            (ENV_STREAM_TIMEOUT, "60"),
            (ENV_TRANSPORT, "SSE"),
            (ENV_MODE, "raw_rag"),
        ]));
        assert_eq!(config.base_url, "http://backend:8080");
        assert_eq!(config.stream_timeout, Duration::from_secs(60));
        assert_eq!(config.transport, TransportKind::EventSource);
        assert_eq!(config.response_mode, ResponseMode::RawRag);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_STREAM_TIMEOUT, "soon"),
            (ENV_CONNECT_TIMEOUT, "0"),
            (ENV_TRANSPORT, "carrier-pigeon"),
            (ENV_MODE, "psychic"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_transport_kind_names() {
        assert_eq!(TransportKind::from_name("fetch"), Some(TransportKind::Fetch));
        assert_eq!(TransportKind::from_name("EventSource"), Some(TransportKind::EventSource));
        assert_eq!(TransportKind::from_name("ws"), None);
        assert_eq!(TransportKind::EventSource.to_string(), "sse");
    }
}
