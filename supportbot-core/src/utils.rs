// supportbot-core/src/utils.rs
//! Small text helpers shared by the agent and the CLI.

/// Shortens `input` to at most `max_chars` characters, ending in "..." when
/// something was cut. Counts characters, not bytes.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    if max_chars < 3 {
        return input.chars().take(max_chars).collect();
    }
    let kept: String = input.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Single-line preview for logs: newlines are escaped, then truncated.
pub fn preview(input: &str, max_chars: usize) -> String {
    truncate_string(&input.replace('\n', "\\n"), max_chars)
}
