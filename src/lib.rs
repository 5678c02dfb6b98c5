//! ragchat - streaming client for an asynchronous RAG job runner
//!
//! A message is submitted as a job; the job's progress, disclosed prompt
//! and answer then arrive over a server-sent event stream and are folded
//! into a transcript.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod state;
pub mod traits;
pub mod view;
