use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of one stream session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Session constructed, transport not yet open
    #[default]
    Submitting,
    /// Transport open, frames flowing
    Streaming,
    Completed,
    Failed,
    /// Deadline passed without a terminal frame
    TimedOut,
    /// Transport dropped before any answer arrived
    Interrupted,
}

impl Phase {
    /// Terminal phases absorb every later event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::Completed | Phase::Failed | Phase::TimedOut | Phase::Interrupted
        )
    }

    /// Phases from which the user may start a fresh session for the same job.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Phase::TimedOut | Phase::Interrupted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Submitting => "SUBMITTING",
            Phase::Streaming => "STREAMING",
            Phase::Completed => "COMPLETED",
            Phase::Failed => "FAILED",
            Phase::TimedOut => "TIMED_OUT",
            Phase::Interrupted => "INTERRUPTED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
