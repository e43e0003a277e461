// supportbot-core/src/agent_tests.rs
#![cfg(test)]

use super::*;
use crate::config::DEFAULT_SUMMARY_PROMPT;
use crate::strategies::support::TOOL_LIMIT_REPLY;
use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// --- Scripted model provider ---

#[derive(Debug, Clone)]
struct RecordedRequest {
    messages: Vec<ChatMessage>,
    tool_names: Vec<String>,
    single_attempt: bool,
}

enum Scripted {
    Reply(ApiResponse),
    Fail(&'static str),
}

#[derive(Clone)]
struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        single_attempt: bool,
    ) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages,
            tool_names: tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
            single_attempt,
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("ScriptedProvider: script exhausted")),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn get_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        self.respond(messages, tools, false)
    }

    async fn get_completion_once(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        self.respond(messages, tools, true)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// --- Test Helpers ---

fn text(content: &str) -> Scripted {
    Scripted::Reply(ApiResponse {
        id: "chatcmpl-test".to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage::assistant(content),
            finish_reason: "stop".to_string(),
        }],
    })
}

fn tools(calls: &[(&str, &str, &str)]) -> Scripted {
    let message = ChatMessage {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(
            calls
                .iter()
                .map(|(id, name, args)| ToolCall::function(*id, *name, *args))
                .collect(),
        ),
        tool_call_id: None,
    };
    Scripted::Reply(ApiResponse {
        id: "chatcmpl-tools".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: "tool_calls".to_string(),
        }],
    })
}

fn config(max_turns: usize, max_tool_rounds: usize) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.session.max_turns = max_turns;
    config.session.max_tool_rounds = max_tool_rounds;
    config
}

fn agent_with(config: &AgentConfig, script: Vec<Scripted>) -> (Agent, ScriptedProvider) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let provider = ScriptedProvider::new(script);
    let agent = Agent::new(
        config,
        Box::new(provider.clone()),
        Arc::new(SupportToolProvider::default()),
    );
    (agent, provider)
}

fn tool_messages(state: &ConversationState) -> Vec<&ChatMessage> {
    state.messages.iter().filter(|m| m.role == Role::Tool).collect()
}

/// Every tool call in history is answered by the messages right after it.
fn assert_no_unanswered_tool_calls(state: &ConversationState) {
    for (i, message) in state.messages.iter().enumerate() {
        for (offset, call) in message.requested_tool_calls().iter().enumerate() {
            let answer = state
                .messages
                .get(i + 1 + offset)
                .unwrap_or_else(|| panic!("tool call {} has no answer", call.id));
            assert_eq!(answer.role, Role::Tool);
            assert_eq!(answer.tool_call_id.as_deref(), Some(call.id.as_str()));
        }
    }
}

// --- Agent Tests ---

#[tokio::test]
async fn test_return_policy_question_uses_knowledge_base() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(50, 5),
        vec![
            tools(&[("call_1", "search_knowledge_base", r#"{"query": "return policy"}"#)]),
            text("You can return items within 30 days of purchase."),
        ],
    );

    let outcome = agent.handle_input("What is your return policy?").await?;

    assert_eq!(outcome.reply.as_deref(), Some("You can return items within 30 days of purchase."));
    assert_eq!(outcome.phase, SessionPhase::AwaitingInput);
    assert_eq!(outcome.error, None);

    let state = agent.state();
    let tool_msgs = tool_messages(state);
    assert_eq!(tool_msgs.len(), 1);
    assert_eq!(tool_msgs[0].tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_msgs[0].text().contains("30 days"));
    assert_eq!(state.tool_usage.get("search_knowledge_base"), Some(&1));
    assert_no_unanswered_tool_calls(state);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[1], ChatMessage::user("What is your return policy?"));
    assert_eq!(requests[0].tool_names.len(), 4);
    assert!(!requests[0].single_attempt);
    // System prompt is sent, never stored.
    assert!(state.messages.iter().all(|m| m.role != Role::System));
    Ok(())
}

#[tokio::test]
async fn test_short_order_number_is_rejected_by_tool() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![
            tools(&[("call_1", "check_order_status", r#"{"order_number": "123"}"#)]),
            text("That order number looks too short. Could you double-check it?"),
        ],
    );

    let outcome = agent.handle_input("Where is my order 123?").await?;

    assert!(outcome.reply.is_some());
    let tool_msgs = tool_messages(agent.state());
    assert!(tool_msgs[0].text().contains("Invalid order number"));
    Ok(())
}

#[tokio::test]
async fn test_turn_cap_summarizes_without_termination_phrase() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(2, 5),
        vec![
            text("Hello! How can I help?"),
            text("We accept credit cards and PayPal."),
            text("The customer asked about payment methods and was told the accepted options."),
        ],
    );

    let first = agent.handle_input("Hi there").await?;
    assert_eq!(first.phase, SessionPhase::AwaitingInput);

    let second = agent.handle_input("Which payment methods do you accept?").await?;
    assert_eq!(second.reply.as_deref(), Some("We accept credit cards and PayPal."));
    assert!(second.session_ended());
    assert_eq!(
        second.summary.as_deref(),
        Some("The customer asked about payment methods and was told the accepted options.")
    );
    assert_eq!(agent.state().summary(), second.summary.as_deref());
    assert_eq!(second.ended_by, Some(SessionEnd::TurnLimit));

    let requests = provider.requests();
    let summary_request = requests.last().unwrap();
    assert!(summary_request.single_attempt);
    assert!(summary_request.tool_names.is_empty());
    assert_eq!(summary_request.messages[0], ChatMessage::system(DEFAULT_SUMMARY_PROMPT));
    assert_eq!(summary_request.messages.len(), 1 + agent.state().messages.len());

    assert!(matches!(
        agent.handle_input("one more thing").await,
        Err(AgentError::SessionClosed)
    ));
    Ok(())
}

#[tokio::test]
async fn test_unknown_tool_is_reported_not_raised() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![
            tools(&[("call_9", "refund_everything", "{}")]),
            text("Sorry, I can't do that, but I can open a ticket."),
        ],
    );

    let outcome = agent.handle_input("Refund all my orders").await?;

    assert_eq!(outcome.error, None);
    let tool_msgs = tool_messages(agent.state());
    assert_eq!(tool_msgs[0].text(), "Tool refund_everything not found");
    assert!(tool_msgs[0].text().contains("not found"));
    assert_eq!(agent.state().tool_usage.get("refund_everything"), Some(&1));
    Ok(())
}

#[tokio::test]
async fn test_bad_arguments_become_execution_errors() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![
            tools(&[
                ("call_1", "get_customer_info", "{}"),
                ("call_2", "check_order_status", "not json"),
            ]),
            text("I need your email address to look that up."),
        ],
    );

    agent.handle_input("Who am I?").await?;

    let tool_msgs = tool_messages(agent.state());
    assert_eq!(tool_msgs.len(), 2);
    assert!(tool_msgs[0]
        .text()
        .starts_with("Error executing get_customer_info: missing required argument 'customer_email'"));
    assert!(tool_msgs[1].text().starts_with("Error executing check_order_status: "));
    assert_no_unanswered_tool_calls(agent.state());
    Ok(())
}

#[tokio::test]
async fn test_multiple_tool_calls_keep_request_order() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![
            tools(&[
                ("call_a", "get_customer_info", r#"{"customer_email": "jane@example.com"}"#),
                ("call_b", "search_knowledge_base", r#"{"query": "gift cards"}"#),
                ("call_c", "search_knowledge_base", r#"{"query": "warranty"}"#),
            ]),
            text("Hi Jane! Here is what I found."),
        ],
    );

    agent.handle_input("I'm jane@example.com, tell me about gift cards and warranty").await?;

    let state = agent.state();
    let ids: Vec<&str> = tool_messages(state)
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, vec!["call_a", "call_b", "call_c"]);
    assert!(tool_messages(state)[0].text().contains("Jane Doe"));
    assert_eq!(state.tool_usage.get("search_knowledge_base"), Some(&2));
    assert_eq!(state.tool_usage.get("get_customer_info"), Some(&1));
    Ok(())
}

#[tokio::test]
async fn test_api_failure_apologizes_and_keeps_session() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(50, 5),
        vec![
            Scripted::Fail("API error: 503 Service Unavailable - overloaded"),
            text("Standard shipping takes 3-5 business days."),
        ],
    );

    let outcome = agent.handle_input("How long does shipping take?").await?;
    assert_eq!(
        outcome.reply.as_deref(),
        Some("I apologize, but I encountered an error: API error: 503 Service Unavailable - overloaded. Please try rephrasing your question or contact our support team directly.")
    );
    assert_eq!(outcome.phase, SessionPhase::AwaitingInput);
    assert!(outcome.error.is_some());
    assert_eq!(agent.state().messages, vec![ChatMessage::user("How long does shipping take?")]);

    let retry = agent.handle_input("How long does shipping take?").await?;
    assert_eq!(retry.reply.as_deref(), Some("Standard shipping takes 3-5 business days."));
    assert_eq!(provider.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failing_model_cannot_outlast_turn_cap() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(2, 5),
        vec![
            Scripted::Fail("API error: 503 Service Unavailable - overloaded"),
            Scripted::Fail("API error: 503 Service Unavailable - overloaded"),
            text("The customer could not be helped because the service was unavailable."),
        ],
    );

    let first = agent.handle_input("Is my order shipped?").await?;
    assert_eq!(first.phase, SessionPhase::AwaitingInput);
    assert_eq!(first.ended_by, None);

    let second = agent.handle_input("Hello? Is my order shipped?").await?;
    assert!(second.session_ended());
    assert_eq!(second.ended_by, Some(SessionEnd::TurnLimit));
    assert!(second
        .reply
        .as_deref()
        .unwrap()
        .starts_with("I apologize, but I encountered an error: API error: 503"));
    assert_eq!(
        second.summary.as_deref(),
        Some("The customer could not be helped because the service was unavailable.")
    );
    assert!(second.error.is_some());
    assert_eq!(agent.state().user_turns, 2);
    // Apologies are never stored as assistant messages.
    assert!(agent.state().messages.iter().all(|m| m.role == Role::User));

    assert!(matches!(
        agent.handle_input("Anyone there?").await,
        Err(AgentError::SessionClosed)
    ));
    assert_eq!(provider.requests().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_termination_phrase_summarizes_once() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(50, 5),
        vec![
            text("Your order ships tomorrow."),
            text("The customer checked on an order and was told it ships tomorrow."),
        ],
    );

    agent.handle_input("When does my order ship?").await?;
    let outcome = agent.handle_input("Great, thank you!").await?;

    assert_eq!(outcome.reply, None);
    assert!(outcome.session_ended());
    assert_eq!(outcome.ended_by, Some(SessionEnd::CustomerLeft));
    assert_eq!(
        outcome.summary.as_deref(),
        Some("The customer checked on an order and was told it ships tomorrow.")
    );
    assert_eq!(provider.requests().len(), 2);
    assert!(agent.handle_input("bye").await.is_err());
    assert_eq!(provider.requests().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failed_summary_still_terminates() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![Scripted::Fail("Network error after 0 retries: connection refused")],
    );

    let outcome = agent.handle_input("goodbye").await?;

    assert!(outcome.session_ended());
    assert_eq!(outcome.summary, None);
    assert!(outcome.reply.unwrap().starts_with("I apologize, but I encountered an error: Network error"));
    assert!(agent.state().is_terminated());
    assert_eq!(agent.state().summary(), None);
    Ok(())
}

#[tokio::test]
async fn test_tool_round_cap_never_leaves_open_calls() -> Result<()> {
    let (mut agent, provider) = agent_with(
        &config(50, 2),
        vec![
            tools(&[("call_1", "check_order_status", r#"{"order_number": "ABC12345"}"#)]),
            tools(&[("call_2", "check_order_status", r#"{"order_number": "ABC12345"}"#)]),
            tools(&[("call_3", "check_order_status", r#"{"order_number": "ABC12345"}"#)]),
        ],
    );

    let outcome = agent.handle_input("Check order ABC12345 please").await?;

    assert_eq!(outcome.reply.as_deref(), Some(TOOL_LIMIT_REPLY));
    assert_eq!(outcome.phase, SessionPhase::AwaitingInput);
    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].tool_names.len(), 4);
    assert!(requests[2].tool_names.is_empty());

    let state = agent.state();
    assert_no_unanswered_tool_calls(state);
    assert_eq!(tool_messages(state).len(), 2);
    assert_eq!(state.tool_usage.get("check_order_status"), Some(&2));
    Ok(())
}

// --- Session loop ---

struct ScriptedUi {
    inputs: VecDeque<Option<&'static str>>,
    outcomes: Vec<TurnOutcome>,
    thinking: usize,
}

impl ScriptedUi {
    fn new(inputs: Vec<Option<&'static str>>) -> Self {
        Self {
            inputs: inputs.into(),
            outcomes: Vec::new(),
            thinking: 0,
        }
    }
}

impl UserInteraction for ScriptedUi {
    fn read_input(&mut self) -> Result<Option<String>> {
        Ok(self.inputs.pop_front().flatten().map(str::to_string))
    }

    fn thinking(&mut self) {
        self.thinking += 1;
    }

    fn show_outcome(&mut self, outcome: &TurnOutcome, _state: &ConversationState) -> Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_run_session_until_goodbye() -> Result<()> {
    let (mut agent, _provider) = agent_with(
        &config(50, 5),
        vec![
            text("We are open 9 AM to 6 PM EST, Monday to Friday."),
            text("The customer asked about support hours."),
        ],
    );
    let mut ui = ScriptedUi::new(vec![
        Some("What are your hours?"),
        Some("   "),
        Some("ok bye"),
        Some("never read"),
    ]);

    agent.run_session(&mut ui).await?;

    assert_eq!(ui.outcomes.len(), 2);
    assert_eq!(ui.thinking, 2);
    assert!(ui.outcomes[1].session_ended());
    assert_eq!(ui.inputs.len(), 1);
    assert_eq!(agent.state().user_turns, 2);
    Ok(())
}

#[tokio::test]
async fn test_run_session_cancel_skips_summary() -> Result<()> {
    let (mut agent, provider) = agent_with(&config(50, 5), vec![text("Hello!")]);
    let mut ui = ScriptedUi::new(vec![Some("Hi"), None]);

    agent.run_session(&mut ui).await?;

    assert_eq!(ui.outcomes.len(), 1);
    assert_eq!(provider.requests().len(), 1);
    let state = agent.into_state();
    assert_eq!(state.phase, SessionPhase::AwaitingInput);
    assert_eq!(state.summary(), None);
    Ok(())
}
