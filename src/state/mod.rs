//! Job session state and its transition function.
//!
//! - `phase` - Session phases and their properties
//! - `session_state` - JobSessionState, the snapshot observers see
//! - `reducer` - Pure `(state, event) -> (state, intents)` transitions

mod phase;
mod reducer;
mod session_state;

pub use phase::Phase;
pub use reducer::{reduce, retry, Intent, SessionEvent};
pub use session_state::{
    JobSessionState, CONNECTION_FAILED_STATUS, CONNECTION_LOST_STATUS, MALFORMED_STATUS_PREFIX,
    RETRYING_STATUS,
};
