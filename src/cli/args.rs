//! Command-line argument parsing.
//!
//! Flags override the environment; whatever is left over is sent as a
//! single message.

use std::time::Duration;

use crate::config::{parse_secs, ClientConfig, TransportKind};
use crate::error::{ChatError, ChatResult};
use crate::models::ResponseMode;

pub const USAGE: &str = "\
Usage: ragchat [OPTIONS] [MESSAGE...]

Without MESSAGE, prompts are read from stdin.

Options:
  --url <URL>            Backend base URL
  --mode <MODE>          rag-only | rag-with-fallback | pure-llm | raw-rag
  --transport <KIND>     fetch | sse
  --timeout <SECS>       Stream timeout in seconds
  -V, --version          Print version
  -h, --help             Print this help

Commands inside the prompt loop:
  /retry                 Reconnect to a timed-out or interrupted job
  /mode <MODE>           Switch response mode
  /status                Show backend status
  /config                Show backend configuration
  /quit                  Exit";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Version,
    Help,
    Run(RunOptions),
}

/// Overrides for a chat run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub url: Option<String>,
    pub mode: Option<ResponseMode>,
    pub transport: Option<TransportKind>,
    pub timeout: Option<Duration>,
    /// One-shot message; `None` means interactive
    pub message: Option<String>,
}

impl RunOptions {
    /// Layer these options over `config`.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config = config.with_base_url(url.clone());
        }
        if let Some(mode) = self.mode {
            config = config.with_response_mode(mode);
        }
        if let Some(transport) = self.transport {
            config = config.with_transport(transport);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_stream_timeout(timeout);
        }
        config
    }
}

/// Parse command-line arguments, program name first.
///
/// # Examples
///
/// ```
/// use ragchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ragchat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> ChatResult<CliCommand>
where
    I: Iterator<Item = String>,
{
    let mut options = RunOptions::default();
    let mut words = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--url" => options.url = Some(value_of(&arg, args.next())?),
            "--mode" => {
                let value = value_of(&arg, args.next())?;
                options.mode = Some(
                    ResponseMode::from_name(&value).ok_or_else(|| invalid(&arg, &value))?,
                );
            }
            "--transport" => {
                let value = value_of(&arg, args.next())?;
                options.transport = Some(
                    TransportKind::from_name(&value).ok_or_else(|| invalid(&arg, &value))?,
                );
            }
            "--timeout" => {
                let value = value_of(&arg, args.next())?;
                options.timeout =
                    Some(parse_secs(&arg, &value).ok_or_else(|| invalid(&arg, &value))?);
            }
            "--" => {
                words.extend(args.by_ref());
            }
            flag if flag.starts_with("--") => {
                return Err(ChatError::Configuration(format!("unknown flag '{}'", flag)));
            }
            _ => words.push(arg),
        }
    }

    if !words.is_empty() {
        options.message = Some(words.join(" "));
    }
    Ok(CliCommand::Run(options))
}

fn value_of(flag: &str, value: Option<String>) -> ChatResult<String> {
    value.ok_or_else(|| ChatError::Configuration(format!("{} requires a value", flag)))
}

fn invalid(flag: &str, value: &str) -> ChatError {
    ChatError::Configuration(format!("invalid value '{}' for {}", value, flag))
}
