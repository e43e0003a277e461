// supportbot-core/src/strategies/mod.rs
use crate::errors::AgentError;
use crate::models::chat::ChatMessage;
use crate::{ConversationState, SessionEnd, ToolResult};

pub mod support;
pub mod turn;

/// What the agent should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// Ask the model. Tool definitions are offered only when `with_tools` is set.
    CallApi { with_tools: bool },
    /// Run the pending tool calls in the state.
    CallTools,
    /// The turn is over; show `reply` and wait for the next input.
    AwaitInput { reply: String },
    /// Produce the closing summary. `reply` is this turn's answer, if any.
    Summarize {
        reply: Option<String>,
        reason: SessionEnd,
    },
    /// The session has ended.
    Completed,
}

pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn process_user_input(
        &mut self,
        state: &mut ConversationState,
        input: &str,
    ) -> Result<NextStep, AgentError>;

    fn process_assistant_message(
        &mut self,
        state: &mut ConversationState,
        message: ChatMessage,
    ) -> Result<NextStep, AgentError>;

    fn process_tool_results(
        &mut self,
        state: &mut ConversationState,
        results: Vec<ToolResult>,
    ) -> Result<NextStep, AgentError>;

    /// The model call failed; `reply` is the apology that ends the turn.
    fn process_api_failure(
        &mut self,
        state: &mut ConversationState,
        reply: String,
    ) -> Result<NextStep, AgentError>;

    /// `summary` is `None` when the summarizer failed.
    fn process_summary(
        &mut self,
        state: &mut ConversationState,
        summary: Option<String>,
    ) -> Result<NextStep, AgentError>;
}
