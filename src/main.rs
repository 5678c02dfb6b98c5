use ragchat::chat::{Conversation, SendOutcome};
use ragchat::cli::{
    parse_args, render::print_config_panel, render::print_connection_info, run_cli_command,
    version_line, Renderer, USAGE,
};
use ragchat::config::ClientConfig;
use ragchat::error::ChatError;
use ragchat::models::ResponseMode;
use ragchat::traits::HttpClient;

use color_eyre::Result;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout carries only the transcript.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ragchat=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Render until the current job settles or the user presses Ctrl+C.
///
/// Returns true when interrupted.
async fn follow<C: HttpClient>(
    chat: &Conversation<C>,
    renderer: &mut Renderer,
    out: &mut impl Write,
) -> io::Result<bool> {
    let Some(mut snapshots) = chat.subscribe() else {
        renderer.render(&chat.view(), out)?;
        return Ok(false);
    };

    loop {
        renderer.render(&chat.view(), out)?;
        if snapshots.borrow_and_update().is_settled() {
            return Ok(false);
        }
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    renderer.render(&chat.view(), out)?;
                    return Ok(false);
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(true),
        }
    }
}

async fn send_and_follow<C: HttpClient>(
    chat: &mut Conversation<C>,
    renderer: &mut Renderer,
    message: &str,
) -> Result<()> {
    let mut out = io::stdout();
    match chat.send(message).await {
        Ok(SendOutcome::Ignored) => return Ok(()),
        Ok(SendOutcome::SubmissionFailed(err)) => debug!(code = err.error_code(), "Send failed"),
        Ok(_) => {}
        Err(err) => {
            print_error(&err);
            return Ok(());
        }
    }
    if follow(chat, renderer, &mut out).await? {
        chat.cancel();
        renderer.render(&chat.view(), &mut out)?;
        eprintln!("Cancelled.");
    }
    Ok(())
}

fn print_error(err: &ChatError) {
    eprintln!("{} ({})", err.user_message(), err.recovery_hint());
}

async fn handle_command<C: HttpClient>(
    chat: &mut Conversation<C>,
    renderer: &mut Renderer,
    line: &str,
) -> Result<bool> {
    let mut out = io::stdout();
    let (command, arg) = line
        .split_once(char::is_whitespace)
        .map(|(c, a)| (c, a.trim()))
        .unwrap_or((line, ""));

    match command {
        "/quit" | "/exit" => return Ok(false),
        "/help" => println!("{}", USAGE),
        "/retry" => match chat.retry() {
            Ok(_) => {
                if follow(chat, renderer, &mut out).await? {
                    chat.cancel();
                    eprintln!("Cancelled.");
                }
            }
            Err(err) => print_error(&err),
        },
        "/mode" if arg.is_empty() => println!("Response mode: {}", chat.mode()),
        "/mode" => match ResponseMode::from_name(arg) {
            Some(mode) => {
                chat.set_mode(mode);
                println!("Response mode: {}", mode);
            }
            None => eprintln!("Unknown mode '{}'", arg),
        },
        "/status" => match chat.client().fetch_status().await {
            Ok(status) => println!("Backend status: {}", status),
            Err(err) => print_error(&ChatError::from(err)),
        },
        "/config" => match &chat.view().config_panel {
            Some(panel) => print_config_panel(&mut out, panel)?,
            None => println!("Backend configuration unavailable."),
        },
        other => eprintln!("Unknown command '{}' (try /help)", other),
    }
    Ok(true)
}

async fn run(config: ClientConfig, message: Option<String>) -> Result<()> {
    let mut chat = Conversation::connect(&config)?;
    let mut renderer = Renderer::new();

    let metadata = chat.load_metadata().await;
    eprintln!("{}", version_line(metadata.version.as_deref()));
    let view = chat.view();
    if let Some(info) = &view.connection_info {
        print_connection_info(&mut io::stderr(), info)?;
    }

    if let Some(message) = message {
        return send_and_follow(&mut chat, &mut renderer, &message).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.starts_with('/') {
            if !handle_command(&mut chat, &mut renderer, line).await? {
                break;
            }
        } else {
            send_and_follow(&mut chat, &mut renderer, line).await?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args())?;
    let Some(options) = run_cli_command(command) else {
        return Ok(());
    };
    let config = options.apply(ClientConfig::from_env());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(config, options.message));
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}
