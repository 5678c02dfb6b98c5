//! Error handling for the chat client.
//!
//! Each layer has its own error enum; [`ChatError`] unifies them for the
//! conversation controller and the binary.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Client | Protocol violations | No |
//! | User | User action required | No |
//! | Configuration | Config issues | No |
//!
//! Stream failures never propagate as errors out of a session; they become
//! phase transitions in the reducer.

mod category;
mod chat_error;
mod network;
mod result;
mod stream;
mod submission;

pub use category::ErrorCategory;
pub use chat_error::ChatError;
pub use network::NetworkError;
pub use result::ChatResult;
pub use stream::StreamError;
pub use submission::SubmissionError;
