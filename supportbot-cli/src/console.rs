// supportbot-cli/src/console.rs
use crate::rendering::{format_tool_usage, print_formatted};
use anyhow::{anyhow, Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use supportbot_core::config::SessionConfig;
use supportbot_core::{ConversationState, SessionEnd, TurnOutcome, UserInteraction};
use tracing::{debug, error, info, warn};

pub const FAREWELL: &str = "Thank you for using our customer support! Goodbye!";
pub const MAX_LENGTH_FAREWELL: &str =
    "Maximum conversation length reached. Thank you for using our support!";

/// Closing line for a session that ended for `reason`.
pub fn farewell_for(reason: Option<SessionEnd>) -> &'static str {
    match reason {
        Some(SessionEnd::TurnLimit) => MAX_LENGTH_FAREWELL,
        Some(SessionEnd::CustomerLeft) | None => FAREWELL,
    }
}

/// Whole-line match against the console exit commands, ignoring case.
pub fn is_exit_command<S: AsRef<str>>(input: &str, exit_commands: &[S]) -> bool {
    let input = input.trim();
    exit_commands
        .iter()
        .any(|command| command.as_ref().eq_ignore_ascii_case(input))
}

pub fn print_welcome_message() {
    println!("{}", "Customer Support Assistant".bold().cyan());
    println!("Type 'quit' to exit");
    println!("{}", "=".repeat(60));
    println!("I can help you with:");
    for topic in [
        "Order status and tracking",
        "Return and refund policies",
        "Shipping information",
        "Payment and account questions",
        "Creating support tickets",
        "Customer information",
    ] {
        println!("  • {}", topic);
    }
    println!("{}", "=".repeat(60));
}

pub fn print_reply(reply: &str) {
    println!("\n{}", "Assistant:".green().bold());
    if let Err(e) = print_formatted(reply) {
        error!("Failed to render reply markdown: {}. Printing raw.", e);
        println!("{}", reply);
    }
}

pub fn print_tool_usage(state: &ConversationState) {
    if let Some(usage) = format_tool_usage(&state.tool_usage) {
        println!("{} {}", "Tools used:".dimmed(), usage.dimmed());
    }
}

pub fn print_summary(summary: &str) {
    println!("\n{}", "Conversation summary:".bold());
    println!("{}", summary);
}

pub(crate) fn thinking_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        Ok(style) => pb.set_style(
            style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "-"]),
        ),
        Err(e) => debug!(error = %e, "Invalid spinner template; using default style."),
    }
    pb.set_message("Thinking...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Interactive console: rustyline for input, spinner while the model works,
/// markdown rendering for replies.
pub struct CliUserInteraction {
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
    spinner: Option<ProgressBar>,
    exit_commands: Vec<String>,
    show_tool_usage: bool,
}

impl CliUserInteraction {
    pub fn new(session: &SessionConfig) -> Result<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .edit_mode(rustyline::EditMode::Emacs)
            .auto_add_history(true)
            .build();
        let mut editor = DefaultEditor::with_config(rl_config)
            .context("Failed to initialize line editor")?;

        // Line history is a convenience; a missing cache dir just disables it.
        let history_file = dirs::cache_dir().map(|d| d.join("supportbot"));
        let history_file = match history_file {
            Some(dir) => match fs::create_dir_all(&dir) {
                Ok(()) => Some(dir.join("cli_history.txt")),
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Cannot create history directory.");
                    None
                }
            },
            None => None,
        };
        if let Some(path) = &history_file {
            if editor.load_history(path).is_err() {
                debug!(path = %path.display(), "No previous CLI history found or error loading.");
            }
        }

        Ok(Self {
            editor,
            history_file,
            spinner: None,
            exit_commands: session.exit_commands.clone(),
            show_tool_usage: session.show_tool_usage,
        })
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                warn!(path = %path.display(), error = %e, "Failed to save CLI history.");
            }
        }
    }
}

impl Drop for CliUserInteraction {
    fn drop(&mut self) {
        self.stop_spinner();
        self.save_history();
    }
}

impl UserInteraction for CliUserInteraction {
    fn read_input(&mut self) -> Result<Option<String>> {
        let prompt = format!("\n{} ", "You:".blue().bold());
        loop {
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if is_exit_command(&line, &self.exit_commands) {
                        info!("Exit command entered, leaving the session.");
                        println!("{}", FAREWELL.cyan());
                        return Ok(None);
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".yellow());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    info!("EOF detected, leaving the session.");
                    println!("{}", FAREWELL.cyan());
                    return Ok(None);
                }
                Err(err) => {
                    error!("Readline error: {:?}", err);
                    return Err(anyhow!("Error reading input: {}", err));
                }
            }
        }
    }

    fn thinking(&mut self) {
        self.stop_spinner();
        self.spinner = Some(thinking_spinner());
    }

    fn show_outcome(&mut self, outcome: &TurnOutcome, state: &ConversationState) -> Result<()> {
        self.stop_spinner();

        if let Some(reply) = &outcome.reply {
            print_reply(reply);
        }
        if self.show_tool_usage {
            print_tool_usage(state);
        }

        if outcome.session_ended() {
            println!("\n{}", farewell_for(outcome.ended_by).cyan());
            match &outcome.summary {
                Some(summary) => print_summary(summary),
                None => {
                    if let Some(e) = &outcome.error {
                        eprintln!("{} {}", "Summary unavailable:".yellow(), e);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands() -> Vec<String> {
        SessionConfig::default().exit_commands
    }

    #[test]
    fn test_exit_commands_match_whole_line_any_case() {
        for input in ["quit", "EXIT", " Bye ", "GoodBye"] {
            assert!(is_exit_command(input, &commands()), "{}", input);
        }
    }

    #[test]
    fn test_sentences_are_not_exit_commands() {
        for input in ["bye for now", "how do I exit the app?", "", "quitting"] {
            assert!(!is_exit_command(input, &commands()), "{}", input);
        }
    }

    #[test]
    fn test_farewell_follows_end_reason() {
        assert_eq!(farewell_for(Some(SessionEnd::TurnLimit)), MAX_LENGTH_FAREWELL);
        assert_eq!(farewell_for(Some(SessionEnd::CustomerLeft)), FAREWELL);
        assert_eq!(farewell_for(None), FAREWELL);
    }

    #[test]
    fn test_custom_exit_commands() {
        assert!(is_exit_command("adios", &["adios"]));
        assert!(!is_exit_command("quit", &["adios"]));
    }
}
