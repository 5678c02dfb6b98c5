use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

/// How the backend should answer a submitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseMode {
    /// Answer only from retrieved context
    #[default]
    RagOnly,
    /// Retrieved context first, plain LLM answer when nothing relevant is found
    RagWithFallback,
    /// Skip retrieval entirely
    PureLlm,
    /// Return the concatenated retrieval hits without summarization
    RawRag,
}

impl ResponseMode {
    pub const ALL: [ResponseMode; 4] = [
        ResponseMode::RagOnly,
        ResponseMode::RagWithFallback,
        ResponseMode::PureLlm,
        ResponseMode::RawRag,
    ];

    /// Whether the backend answers this mode through an asynchronous job stream.
    ///
    /// Raw RAG is answered synchronously in the submission response.
    pub fn is_streaming(&self) -> bool {
        !matches!(self, ResponseMode::RawRag)
    }

    /// Short name used on the command line and in the environment.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::RagOnly => "rag-only",
            ResponseMode::RagWithFallback => "rag-with-fallback",
            ResponseMode::PureLlm => "pure-llm",
            ResponseMode::RawRag => "raw-rag",
        }
    }

    /// Parse a mode name. Accepts `rag-only`, `RAG_ONLY`, `rag_only`, ...
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/job`.
///
/// The backend does not take the mode as an enum; it derives it from three flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// The user's free-text message
    pub message: String,
    /// Fall back to a plain LLM answer when retrieval finds nothing relevant
    pub include_llm_fallback: bool,
    /// Bypass retrieval (takes precedence over the fallback flag)
    pub use_pure_llm: bool,
    /// Return raw retrieval hits synchronously
    pub raw_rag: bool,
}

impl JobRequest {
    pub fn new(message: impl Into<String>, mode: ResponseMode) -> Self {
        Self {
            message: message.into(),
            include_llm_fallback: mode == ResponseMode::RagWithFallback,
            use_pure_llm: mode == ResponseMode::PureLlm,
            raw_rag: mode == ResponseMode::RawRag,
        }
    }

    /// Recover the mode from the wire flags.
    pub fn mode(&self) -> ResponseMode {
        if self.raw_rag {
            ResponseMode::RawRag
        } else if self.use_pure_llm {
            ResponseMode::PureLlm
        } else if self.include_llm_fallback {
            ResponseMode::RagWithFallback
        } else {
            ResponseMode::RagOnly
        }
    }
}

/// One accepted submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: String,
    message: String,
    mode: ResponseMode,
    created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: impl Into<String>, request: &JobRequest) -> Self {
        Self {
            id: id.into(),
            message: request.message.clone(),
            mode: request.mode(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Raw body of a successful `POST /api/job` response.
///
/// Streaming modes answer `{"jobId": ...}`; raw RAG answers
/// `{"answer": ..., "source": ...}` or `{"bubbles": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub bubbles: Option<Vec<String>>,
}

/// A synchronous answer that never goes through a stream session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectAnswer {
    /// One transcript entry per bubble, in order
    pub bubbles: Vec<String>,
    /// "RAG", "LLM" or "ERROR" when the backend reports it
    pub source: Option<String>,
}

/// What a submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend accepted an asynchronous job
    Streaming { job_id: String },
    /// The backend answered inline
    Direct(DirectAnswer),
}

impl SubmitResponse {
    /// Interpret the body for the mode it was requested with.
    pub fn into_outcome(self, mode: ResponseMode) -> Result<SubmitOutcome, SubmissionError> {
        if mode.is_streaming() {
            return match self.job_id {
                Some(job_id) if !job_id.trim().is_empty() => Ok(SubmitOutcome::Streaming { job_id }),
                _ => Err(SubmissionError::MissingJobId),
            };
        }

        let bubbles = match (self.bubbles, self.answer) {
            (Some(bubbles), _) if !bubbles.is_empty() => bubbles,
            (_, Some(answer)) => vec![answer],
            _ => return Err(SubmissionError::EmptyAnswer),
        };
        Ok(SubmitOutcome::Direct(DirectAnswer {
            bubbles,
            source: self.source,
        }))
    }
}
