// supportbot-core/src/strategies/support.rs
use super::turn::{decide, TurnDecision};
use super::{NextStep, Strategy};
use crate::config::SessionConfig;
use crate::errors::AgentError;
use crate::models::chat::{ChatMessage, Role};
use crate::{ConversationState, SessionEnd, SessionPhase, ToolResult};
use tracing::{debug, info, warn};

/// Reply used when the model keeps asking for tools past the per-turn limit.
pub const TOOL_LIMIT_REPLY: &str = "I'm sorry, I wasn't able to finish looking that up. Could you rephrase your question, or would you like me to create a support ticket?";

/// Turn-taking for a support conversation: answer, use tools as asked, and
/// summarize when the customer leaves or the session runs long.
pub struct SupportStrategy {
    termination_phrases: Vec<String>,
    max_turns: usize,
    max_tool_rounds: usize,
    tool_rounds: usize,
}

impl SupportStrategy {
    pub fn new(session: &SessionConfig) -> Self {
        Self {
            termination_phrases: session.termination_phrases.clone(),
            max_turns: session.max_turns,
            max_tool_rounds: session.max_tool_rounds,
            tool_rounds: 0,
        }
    }

    fn finish_turn(&self, state: &mut ConversationState, reply: String) -> NextStep {
        if state.user_turns >= self.max_turns {
            info!(
                user_turns = state.user_turns,
                max_turns = self.max_turns,
                "Maximum conversation length reached."
            );
            state.phase = SessionPhase::Summarizing;
            return NextStep::Summarize {
                reply: Some(reply),
                reason: SessionEnd::TurnLimit,
            };
        }
        state.phase = SessionPhase::AwaitingInput;
        NextStep::AwaitInput { reply }
    }
}

impl Strategy for SupportStrategy {
    fn name(&self) -> &'static str {
        "Support"
    }

    fn process_user_input(
        &mut self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<NextStep, AgentError> {
        match state.phase {
            SessionPhase::AwaitingInput => {}
            SessionPhase::Terminated => return Err(AgentError::SessionClosed),
            other => {
                return Err(AgentError::Strategy(format!(
                    "Input received while the session is in phase {:?}",
                    other
                )))
            }
        }

        state.add_user_message(input);
        self.tool_rounds = 0;

        if decide(&state.messages, &self.termination_phrases) == TurnDecision::End {
            info!(user_turns = state.user_turns, "Customer ended the conversation.");
            state.phase = SessionPhase::Summarizing;
            return Ok(NextStep::Summarize {
                reply: None,
                reason: SessionEnd::CustomerLeft,
            });
        }

        state.phase = SessionPhase::Generating;
        Ok(NextStep::CallApi { with_tools: true })
    }

    fn process_assistant_message(
        &mut self,
        state: &mut ConversationState,
        mut message: ChatMessage,
    ) -> Result<NextStep, AgentError> {
        message.role = Role::Assistant;
        message.tool_call_id = None;

        let has_tool_calls = !message.requested_tool_calls().is_empty();
        if has_tool_calls && self.tool_rounds >= self.max_tool_rounds {
            warn!(
                tool_rounds = self.tool_rounds,
                "Model requested tools after the per-turn limit; dropping the calls."
            );
            message.tool_calls = None;
            let text = message.text().trim().to_string();
            let reply = if text.is_empty() {
                message.content = Some(TOOL_LIMIT_REPLY.to_string());
                TOOL_LIMIT_REPLY.to_string()
            } else {
                text
            };
            state.add_message(message);
            return Ok(self.finish_turn(state, reply));
        }

        if has_tool_calls {
            let calls = message.requested_tool_calls().to_vec();
            debug!(count = calls.len(), "Model requested tool calls.");
            state.add_message(message);
            state.set_tool_calls(calls);
            state.phase = SessionPhase::DispatchingTools;
            return Ok(NextStep::CallTools);
        }

        // An empty `tool_calls` list is treated like none at all.
        message.tool_calls = None;
        let reply = message.text().to_string();
        state.add_message(message);
        Ok(self.finish_turn(state, reply))
    }

    fn process_tool_results(
        &mut self,
        state: &mut ConversationState,
        results: Vec<ToolResult>,
    ) -> Result<NextStep, AgentError> {
        let expected = state.pending_tool_calls().len();
        if results.len() != expected {
            return Err(AgentError::Strategy(format!(
                "Expected {} tool result(s), got {}",
                expected,
                results.len()
            )));
        }
        state.add_tool_results(results);
        self.tool_rounds += 1;
        state.phase = SessionPhase::Generating;
        Ok(NextStep::CallApi {
            with_tools: self.tool_rounds < self.max_tool_rounds,
        })
    }

    fn process_api_failure(
        &mut self,
        state: &mut ConversationState,
        reply: String,
    ) -> Result<NextStep, AgentError> {
        // The apology is shown, not stored; the user message stays for a retry.
        Ok(self.finish_turn(state, reply))
    }

    fn process_summary(
        &mut self,
        state: &mut ConversationState,
        summary: Option<String>,
    ) -> Result<NextStep, AgentError> {
        if let Some(summary) = summary {
            if !state.set_summary(summary) {
                warn!("Conversation summary was already set; keeping the first one.");
            }
        }
        state.phase = SessionPhase::Terminated;
        Ok(NextStep::Completed)
    }
}
