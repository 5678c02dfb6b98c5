//! Job event stream parsing.
//!
//! Turns what the events endpoint sends into [`StreamFrame`]s. The
//! endpoint mixes two shapes on the same stream:
//! - `data: {"statusMessage":"...","progress":40}` - structured job status
//! - `data: some answer text` - raw answer chunks, whitespace preserved
//!
//! # Module structure
//! - `frames` - Frame definitions (StreamFrame, TerminalOutcome)
//! - `payloads` - Structured payload deserialization
//! - `parser` - Payload classification (parse_payload, strip_framing)
//! - `lines` - Byte-to-line splitting for chunked transports

mod frames;
mod lines;
mod parser;
mod payloads;

pub use frames::{StreamFrame, TerminalOutcome};
pub use lines::{classify_line, LineSplitter, SseLine};
pub use parser::{parse_payload, strip_framing, DATA_PREFIX};
