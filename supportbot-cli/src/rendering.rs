// supportbot-cli/src/rendering.rs
use anyhow::Result;
use std::collections::BTreeMap;
use std::io::{self, Write};
use termimad::{crossterm::style::Color, MadSkin};

fn create_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.bold.set_fg(Color::White);
    skin.italic.set_fg(Color::Grey);
    skin.inline_code.set_fg(Color::Cyan);
    skin.inline_code.set_bg(Color::Reset);
    skin.bullet.set_fg(Color::Cyan);
    skin
}

/// Renders markdown from the model to stdout.
pub fn print_formatted(markdown_text: &str) -> Result<()> {
    let skin = create_skin();
    let mut stdout = io::stdout().lock();
    skin.write_text_on(&mut stdout, markdown_text)?;
    stdout.flush()?;
    Ok(())
}

/// `name: count` pairs, in name order.
pub fn format_tool_usage(usage: &BTreeMap<String, usize>) -> Option<String> {
    if usage.is_empty() {
        return None;
    }
    let parts: Vec<String> = usage
        .iter()
        .map(|(tool, count)| format!("{}: {}", tool, count))
        .collect();
    Some(parts.join(", "))
}
