// supportbot-core/src/api/ollama.rs
use super::openai::function_tools;
use super::{generate_id, ChatApiProvider};
use crate::config::DEFAULT_OLLAMA_ENDPOINT;
use crate::models::chat::{ApiResponse, ChatMessage, Choice, Role};
use crate::models::tools::{ToolCall, ToolDefinition};
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use toml::Value as TomlValue;

/// Ollama `/api/chat` dialect, non-streaming.
///
/// Ollama sends tool arguments as JSON objects and gives tool calls no ids, so
/// both are converted at this boundary.
pub struct OllamaProvider {
    endpoint: String,
}

impl OllamaProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_OLLAMA_ENDPOINT.to_string()),
        }
    }
}

fn message_to_json(message: &ChatMessage) -> Value {
    let mut value = json!({
        "role": message.role,
        "content": message.text(),
    });
    let calls = message.requested_tool_calls();
    if !calls.is_empty() {
        let calls: Vec<Value> = calls
            .iter()
            .map(|call| {
                let arguments: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| json!({}));
                json!({
                    "function": {
                        "name": call.function.name,
                        "arguments": arguments,
                    }
                })
            })
            .collect();
        value["tool_calls"] = json!(calls);
    }
    value
}

fn parse_tool_calls(message: &Value) -> Option<Vec<ToolCall>> {
    let calls = message.get("tool_calls")?.as_array()?;
    let parsed: Vec<ToolCall> = calls
        .iter()
        .filter_map(|call| {
            let function = call.get("function")?;
            let name = function.get("name")?.as_str()?;
            let arguments = match function.get("arguments") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "{}".to_string(),
            };
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| generate_id("call"));
            Some(ToolCall::function(id, name, arguments))
        })
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

impl ChatApiProvider for OllamaProvider {
    fn build_payload(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        parameters: Option<&TomlValue>,
    ) -> Result<Value> {
        let messages: Vec<Value> = messages.iter().map(message_to_json).collect();
        let mut payload = json!({
            "model": model_name,
            "messages": messages,
            "stream": false,
        });

        if let Some(tools_json) = function_tools(tools) {
            payload["tools"] = json!(tools_json);
        }

        // Sampling settings live under `options`; `max_tokens` is `num_predict` here.
        if let Some(params) = parameters.and_then(TomlValue::as_table) {
            let mut options = serde_json::Map::new();
            for (key, value) in params {
                let name = if key == "max_tokens" { "num_predict" } else { key.as_str() };
                let json_value = serde_json::to_value(value.clone()).with_context(|| {
                    format!("Failed to convert TOML parameter '{}' to JSON", key)
                })?;
                options.insert(name.to_string(), json_value);
            }
            if !options.is_empty() {
                payload["options"] = Value::Object(options);
            }
        }

        Ok(payload)
    }

    fn parse_response(&self, response_body: &str) -> Result<ApiResponse> {
        let raw_response: Value = serde_json::from_str(response_body)
            .with_context(|| format!("Failed to parse Ollama response: {}", response_body))?;

        let message = raw_response.get("message").ok_or_else(|| {
            anyhow!(
                "Failed to extract message from Ollama response structure: {}",
                response_body
            )
        })?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let tool_calls = parse_tool_calls(message);
        let finish_reason = if tool_calls.is_some() {
            "tool_calls".to_string()
        } else {
            raw_response
                .get("done_reason")
                .and_then(Value::as_str)
                .unwrap_or("stop")
                .to_string()
        };

        Ok(ApiResponse {
            id: generate_id("ollama"),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage {
                    role: Role::Assistant,
                    content,
                    tool_calls,
                    tool_call_id: None,
                },
                finish_reason,
            }],
        })
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn get_endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
