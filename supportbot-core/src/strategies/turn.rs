// supportbot-core/src/strategies/turn.rs
//! Decides whether the conversation continues after the latest message.

use crate::models::chat::{ChatMessage, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    Continue,
    End,
}

/// Ends the conversation when the last message is from the user and contains
/// any of `phrases`, ignoring case. Matching is by substring, so "goodbye"
/// also matches "bye" and "stop" matches "nonstop shipping".
pub fn decide<S: AsRef<str>>(history: &[ChatMessage], phrases: &[S]) -> TurnDecision {
    let Some(last) = history.last() else {
        return TurnDecision::Continue;
    };
    if last.role != Role::User {
        return TurnDecision::Continue;
    }
    let text = last.text().to_lowercase();
    let ends = phrases
        .iter()
        .map(|p| p.as_ref().to_lowercase())
        .any(|p| !p.is_empty() && text.contains(&p));
    if ends {
        TurnDecision::End
    } else {
        TurnDecision::Continue
    }
}
