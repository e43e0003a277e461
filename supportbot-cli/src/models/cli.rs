use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Supportbot: a customer support assistant for the terminal.
/// Starts an interactive session by default, or answers a single message.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase message verbosity.
    ///
    /// Specify multiple times for more verbose output:
    ///  -v:  INFO level
    ///  -vv: DEBUG level
    ///  -vvv: TRACE level (most verbose)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Answer a single message non-interactively and exit.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Path to a Support.toml. Defaults to the nearest one up from the current directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model name, overriding LLM_MODEL and the config file.
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature, overriding LLM_TEMPERATURE and the config file.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Debug logging, same as DEBUG_MODE=true.
    #[arg(long)]
    pub debug: bool,
}
