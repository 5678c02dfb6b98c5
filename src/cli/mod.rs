//! Command-line front end.
//!
//! - `args` - Flag parsing into a [`CliCommand`]
//! - `render` - Incremental terminal printer for transcript views
//! - `version` - Version string
//!
//! ```ignore
//! use ragchat::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! if let Some(options) = run_cli_command(command) {
//!     // start the chat with `options`
//! }
//! ```

pub mod args;
pub mod render;
pub mod version;

pub use args::{parse_args, CliCommand, RunOptions, USAGE};
pub use render::Renderer;
pub use version::{version_line, VERSION};

/// Handle the commands that finish immediately.
///
/// Returns the run options when a chat should be started.
pub fn run_cli_command(command: CliCommand) -> Option<RunOptions> {
    match command {
        CliCommand::Version => {
            println!("{}", version_line(None));
            None
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            None
        }
        CliCommand::Run(options) => Some(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_options() {
        let options = RunOptions {
            message: Some("hi".to_string()),
            ..RunOptions::default()
        };
        assert_eq!(run_cli_command(CliCommand::Run(options.clone())), Some(options));
    }

    #[test]
    fn test_version_returns_none() {
        assert!(run_cli_command(CliCommand::Version).is_none());
    }
}
