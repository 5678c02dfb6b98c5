//! Domain models shared by the client, the reducer and the projector.

mod job;
mod transcript;

pub use job::{DirectAnswer, Job, JobRequest, ResponseMode, SubmitOutcome, SubmitResponse};
pub use transcript::{
    EntryKind, Role, TranscriptEntry, INTERRUPTION_TEXT, PLACEHOLDER_TEXT,
    SUBMISSION_ERROR_PREFIX, TIMEOUT_TEXT,
};
