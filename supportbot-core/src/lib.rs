// supportbot-core/src/lib.rs

#![doc = include_str!("../../README.md")]

pub mod agent;
pub mod api;
pub mod config;
pub mod errors;
pub mod providers;
pub mod strategies;
pub mod tools;
pub mod utils;

pub mod models {
    pub mod chat;
    pub mod tools;
}

#[cfg(test)]
mod agent_tests;

use anyhow::Result;
use std::collections::BTreeMap;

pub use agent::{Agent, TurnOutcome};
pub use config::{AgentConfig, EnvOverrides, ModelConfig, ProviderType, SessionConfig};
pub use errors::AgentError;
pub use models::chat::{ApiResponse, ChatMessage, Choice, Role};
pub use models::tools::{
    ToolCall, ToolDefinition, ToolFunction, ToolInput, ToolParameter, ToolParameterType,
    ToolParametersDefinition,
};
pub use providers::Provider;
pub use tools::{SupportTool, SupportToolProvider, ToolProvider};

pub use async_trait::async_trait;

/// Indicates whether a tool execution succeeded or failed.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum ToolExecutionStatus {
    /// The tool executed successfully.
    Success,
    /// The tool was unknown or failed during argument parsing or execution.
    Failure,
}

/// Outcome of one dispatched tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// The id of the model's tool call this answers.
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: String,
    pub status: ToolExecutionStatus,
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    AwaitingInput,
    Generating,
    DispatchingTools,
    Summarizing,
    Terminated,
}

/// Why a session moved to summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The customer used a termination phrase.
    CustomerLeft,
    /// The session reached `session.max_turns`.
    TurnLimit,
}

/// Everything one support session remembers.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Append-only history, without the system prompt.
    pub messages: Vec<ChatMessage>,
    /// Invocations per tool name, including names that did not resolve.
    pub tool_usage: BTreeMap<String, usize>,
    pub user_turns: usize,
    pub phase: SessionPhase,
    pending_tool_calls: Vec<ToolCall>,
    summary: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.user_turns += 1;
        self.messages.push(ChatMessage::user(content));
    }

    pub fn set_tool_calls(&mut self, tool_calls: Vec<ToolCall>) {
        self.pending_tool_calls = tool_calls;
    }

    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        &self.pending_tool_calls
    }

    /// Appends one tool message per result, in order, and clears the pending calls.
    pub fn add_tool_results(&mut self, results: Vec<ToolResult>) {
        for result in results {
            self.messages
                .push(ChatMessage::tool(result.tool_call_id, result.output));
        }
        self.pending_tool_calls.clear();
    }

    pub fn record_tool_use(&mut self, tool_name: &str) {
        *self.tool_usage.entry(tool_name.to_string()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Stores the closing summary. Returns false, leaving the first one in
    /// place, if a summary was already set.
    pub fn set_summary(&mut self, summary: String) -> bool {
        if self.summary.is_some() {
            return false;
        }
        self.summary = Some(summary);
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == SessionPhase::Terminated
    }
}

/// Where the session gets its input and shows its output.
pub trait UserInteraction {
    /// Next line from the user. `None` closes the session without a summary.
    fn read_input(&mut self) -> Result<Option<String>>;

    /// Called after the input was accepted, before the model is asked.
    fn thinking(&mut self) {}

    /// Shows what came of one turn.
    fn show_outcome(&mut self, outcome: &TurnOutcome, state: &ConversationState) -> Result<()>;
}
