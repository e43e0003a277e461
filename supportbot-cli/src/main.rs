// supportbot-cli/src/main.rs
mod console;
mod rendering;
mod settings;

mod models {
    pub mod cli;
}

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::*;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use supportbot_core::{config::AgentConfig, Agent, EnvOverrides};

use crate::console::{
    print_summary, print_tool_usage, print_welcome_message, thinking_spinner, CliUserInteraction,
};
use crate::models::cli::Cli;

const LOG_FILE_NAME: &str = "supportbot.log";

fn log_level(verbose: u8, debug: bool) -> Level {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    if debug && level < Level::DEBUG {
        Level::DEBUG
    } else {
        level
    }
}

/// stderr plus a log file in the cache directory. Keep the guard alive for
/// the file writer to flush.
fn init_logging(level: Level) -> Result<(WorkerGuard, PathBuf)> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let log_dir = dirs::cache_dir()
        .or_else(dirs::runtime_dir)
        .unwrap_or_else(env::temp_dir)
        .join("supportbot");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let time_format_desc = time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )
    .context("Failed to parse log time format")?;
    let local_timer = LocalTime::new(time_format_desc);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_timer(local_timer.clone());

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(local_timer)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok((guard, log_dir.join(LOG_FILE_NAME)))
}

/// Answers one message and prints the result plainly.
async fn run_single_turn(agent: &mut Agent, config: &AgentConfig, message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        return Err(anyhow!("--message must not be empty"));
    }
    info!("Running non-interactive turn.");

    let pb = thinking_spinner();

    let outcome = agent.handle_input(message).await;
    pb.finish_and_clear();
    let outcome = outcome?;

    if let Some(reply) = &outcome.reply {
        println!("{}", reply);
    }
    if config.session.show_tool_usage {
        print_tool_usage(agent.state());
    }
    if let Some(summary) = &outcome.summary {
        print_summary(summary);
    }
    Ok(())
}

async fn run_interactive(agent: &mut Agent, config: &AgentConfig) -> Result<()> {
    print_welcome_message();
    let mut ui = CliUserInteraction::new(&config.session)?;
    agent.run_session(&mut ui).await?;
    info!(
        user_turns = agent.state().user_turns,
        "Interactive session finished."
    );
    Ok(())
}

async fn run(cli: Cli, overrides: EnvOverrides) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let mut config = settings::load_config(cli.config.as_deref(), &cwd)?;
    config.apply_overrides(&overrides);

    // Checked before anything talks to the model.
    let api_key = config.resolve_api_key(|var| env::var(var).ok())?;

    let mut agent = Agent::from_config(&config, api_key)?;
    match &cli.message {
        Some(message) => run_single_turn(&mut agent, &config, message).await,
        None => run_interactive(&mut agent, &config).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Colored output for errors printed before logging is set up.
    colored::control::set_override(true);

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let env_overrides = match EnvOverrides::from_env() {
        Ok(overrides) => overrides,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    let overrides = settings::merge_overrides(&cli, env_overrides);

    let level = log_level(cli.verbose, overrides.debug);
    let (_guard, log_path) = match init_logging(level) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    info!(
        "Logging initialized. Level determined by RUST_LOG, -v flags or DEBUG_MODE (default: {}). Logging to stderr and {}",
        level,
        log_path.display()
    );

    match run(cli, overrides).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Operation failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
