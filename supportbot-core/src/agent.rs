// supportbot-core/src/agent.rs
use crate::config::AgentConfig;
use crate::errors::AgentError;
use crate::models::chat::ChatMessage;
use crate::models::tools::{ToolCall, ToolInput};
use crate::providers::{self, Provider};
use crate::strategies::support::SupportStrategy;
use crate::strategies::{NextStep, Strategy};
use crate::tools::{SupportToolProvider, ToolProvider};
use crate::utils::preview;
use crate::{
    ConversationState, SessionEnd, SessionPhase, ToolExecutionStatus, ToolResult, UserInteraction,
};
use anyhow::anyhow;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Reply shown to the customer when the model service fails.
pub fn apology(error: impl Display) -> String {
    format!(
        "I apologize, but I encountered an error: {}. Please try rephrasing your question or contact our support team directly.",
        error
    )
}

/// What one call to [`Agent::handle_input`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The assistant's answer for this turn, or an apology if the model call
    /// failed. `None` when the customer ended the conversation.
    pub reply: Option<String>,
    /// Set when the session closed during this turn and summarizing worked.
    pub summary: Option<String>,
    pub phase: SessionPhase,
    /// Why the session closed, when it closed during this turn.
    pub ended_by: Option<SessionEnd>,
    /// What went wrong, when something did.
    pub error: Option<String>,
}

impl TurnOutcome {
    pub fn session_ended(&self) -> bool {
        self.phase == SessionPhase::Terminated
    }
}

pub struct Agent {
    system_prompt: String,
    summary_prompt: String,
    provider: Box<dyn Provider>,
    tool_provider: Arc<dyn ToolProvider>,
    strategy: Box<dyn Strategy>,
    state: ConversationState,
}

impl Agent {
    pub fn new(
        config: &AgentConfig,
        provider: Box<dyn Provider>,
        tool_provider: Arc<dyn ToolProvider>,
    ) -> Self {
        let strategy = Box::new(SupportStrategy::new(&config.session));
        info!(
            strategy = strategy.name(),
            provider = provider.name(),
            max_turns = config.session.max_turns,
            "Initializing support agent."
        );
        Self {
            system_prompt: config.system_prompt.clone(),
            summary_prompt: config.summary_prompt.clone(),
            provider,
            tool_provider,
            strategy,
            state: ConversationState::new(),
        }
    }

    /// Agent with the configured model provider and the built-in support tools.
    pub fn from_config(config: &AgentConfig, api_key: String) -> Result<Self, AgentError> {
        let provider = providers::from_config(config, api_key)
            .map_err(|e| AgentError::Config(format!("{:#}", e)))?;
        Ok(Self::new(
            config,
            provider,
            Arc::new(SupportToolProvider::default()),
        ))
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }

    /// Asks the model for the next assistant message, with the system prompt
    /// in front of `history`.
    pub async fn generate(
        &self,
        history: &[ChatMessage],
        with_tools: bool,
    ) -> Result<ChatMessage, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend_from_slice(history);

        let tool_definitions = if with_tools {
            self.tool_provider.get_tool_definitions()
        } else {
            Vec::new()
        };
        debug!(
            provider = self.provider.name(),
            num_messages = messages.len(),
            num_tools = tool_definitions.len(),
            "Sending request to AI provider."
        );

        let tools = if tool_definitions.is_empty() {
            None
        } else {
            Some(tool_definitions.as_slice())
        };
        let response = self
            .provider
            .get_completion(messages, tools)
            .await
            .map_err(AgentError::Api)?;
        trace!(response = %serde_json::to_string_pretty(&response).unwrap_or_default(), "Full API Response");

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Api(anyhow!("API response contained no choices")))?;
        Ok(choice.message)
    }

    /// Runs each tool call in order and counts it against its tool name.
    /// Unknown names and failed calls come back as failure text, never as errors.
    pub fn dispatch(&mut self, tool_calls: &[ToolCall]) -> Vec<ToolResult> {
        info!(count = tool_calls.len(), "Executing {} requested tool call(s).", tool_calls.len());
        let mut results = Vec::with_capacity(tool_calls.len());

        for tool_call in tool_calls {
            let tool_name = tool_call.function.name.as_str();
            self.state.record_tool_use(tool_name);

            let (output, status) = if !self.tool_provider.has_tool(tool_name) {
                warn!(tool_call_id = %tool_call.id, tool_name = %tool_name, "Model requested an unknown tool.");
                (format!("Tool {} not found", tool_name), ToolExecutionStatus::Failure)
            } else {
                let execution = ToolInput::from_json_str(&tool_call.function.arguments)
                    .and_then(|input| self.tool_provider.execute_tool(tool_name, input));
                match execution {
                    Ok(output) => {
                        info!(tool_call_id = %tool_call.id, tool_name = %tool_name, "Tool executed successfully.");
                        trace!(output = %preview(&output, 200), "Output from tool '{}'", tool_name);
                        (output, ToolExecutionStatus::Success)
                    }
                    Err(e) => {
                        error!(tool_call_id = %tool_call.id, tool_name = %tool_name, error = %e, "Tool execution failed.");
                        (
                            format!("Error executing {}: {}", tool_name, e),
                            ToolExecutionStatus::Failure,
                        )
                    }
                }
            };

            results.push(ToolResult {
                tool_call_id: tool_call.id.clone(),
                tool_name: tool_name.to_string(),
                output,
                status,
            });
        }
        results
    }

    /// Summarizes `history` in a single model call, without tools or retries.
    pub async fn summarize(&self, history: &[ChatMessage]) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.summary_prompt.as_str()));
        messages.extend_from_slice(history);

        debug!(num_messages = messages.len(), "Requesting conversation summary.");
        let response = self
            .provider
            .get_completion_once(messages, None)
            .await
            .map_err(AgentError::Api)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Api(anyhow!("Summary response contained no choices")))?;
        Ok(choice.message.text().to_string())
    }

    /// Takes one user message through the conversation state machine until the
    /// agent needs input again or the session ends.
    ///
    /// Model failures do not escape: the turn ends with an apology. It still
    /// counts as a turn, so the session may close at the turn cap.
    pub async fn handle_input(&mut self, input: &str) -> Result<TurnOutcome, AgentError> {
        if self.state.is_terminated() {
            return Err(AgentError::SessionClosed);
        }
        info!(turn = self.state.user_turns + 1, input = %preview(input, 80), "Handling user input.");

        let mut next_step = self.strategy.process_user_input(&mut self.state, input)?;
        let mut reply: Option<String> = None;
        let mut ended_by: Option<SessionEnd> = None;
        let mut turn_error: Option<String> = None;

        loop {
            trace!(?next_step, "Processing next step.");
            match next_step {
                NextStep::CallApi { with_tools } => {
                    match self.generate(&self.state.messages, with_tools).await {
                        Ok(message) => {
                            next_step = self
                                .strategy
                                .process_assistant_message(&mut self.state, message)?;
                        }
                        Err(e) => {
                            error!(error = ?e, "Response generation failed; apologizing.");
                            let detail = e.detail();
                            next_step = self
                                .strategy
                                .process_api_failure(&mut self.state, apology(&detail))?;
                            turn_error = Some(detail);
                        }
                    }
                }
                NextStep::CallTools => {
                    let tool_calls = self.state.pending_tool_calls().to_vec();
                    if tool_calls.is_empty() {
                        return Err(AgentError::Strategy(
                            "Strategy requested tool calls, but none were pending in state".to_string(),
                        ));
                    }
                    let results = self.dispatch(&tool_calls);
                    next_step = self.strategy.process_tool_results(&mut self.state, results)?;
                }
                NextStep::AwaitInput { reply } => {
                    return Ok(TurnOutcome {
                        reply: Some(reply),
                        summary: None,
                        phase: self.state.phase,
                        ended_by: None,
                        error: turn_error,
                    });
                }
                NextStep::Summarize {
                    reply: turn_reply,
                    reason,
                } => {
                    reply = turn_reply;
                    ended_by = Some(reason);
                    let summary = match self.summarize(&self.state.messages).await {
                        Ok(summary) => Some(summary),
                        Err(e) => {
                            error!(error = ?e, "Summarization failed; closing without a summary.");
                            if reply.is_none() {
                                reply = Some(apology(e.detail()));
                            }
                            if turn_error.is_none() {
                                turn_error = Some(e.detail());
                            }
                            None
                        }
                    };
                    next_step = self.strategy.process_summary(&mut self.state, summary)?;
                }
                NextStep::Completed => {
                    info!(
                        user_turns = self.state.user_turns,
                        has_summary = self.state.summary().is_some(),
                        "Support session completed."
                    );
                    return Ok(TurnOutcome {
                        reply,
                        summary: self.state.summary().map(str::to_string),
                        phase: self.state.phase,
                        ended_by,
                        error: turn_error,
                    });
                }
            }
        }
    }

    /// Reads input from `ui` until the session ends or the user leaves.
    pub async fn run_session(&mut self, ui: &mut dyn UserInteraction) -> Result<(), AgentError> {
        info!("Starting support session.");
        while !self.state.is_terminated() {
            let Some(line) = ui.read_input().map_err(AgentError::Ui)? else {
                info!(user_turns = self.state.user_turns, "Session closed by the user.");
                return Ok(());
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            ui.thinking();
            let outcome = self.handle_input(input).await?;
            ui.show_outcome(&outcome, &self.state).map_err(AgentError::Ui)?;
        }
        Ok(())
    }
}
