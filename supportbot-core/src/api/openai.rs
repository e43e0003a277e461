// supportbot-core/src/api/openai.rs
use super::{generate_id, ChatApiProvider};
use crate::config::DEFAULT_OPENAI_ENDPOINT;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;
use anyhow::{anyhow, Context, Result};
use serde_json::{json, to_value, Value};
use std::collections::HashMap;
use toml::Value as TomlValue;
use tracing::debug;

/// OpenAI chat-completions dialect. Also fits compatible gateways.
pub struct OpenAIProvider {
    api_key: String,
    endpoint: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string()),
        }
    }
}

/// Tool schemas in the `{"type": "function", "function": {...}}` wrapping both
/// dialects use.
pub(crate) fn function_tools(tools: Option<&[ToolDefinition]>) -> Option<Vec<Value>> {
    let tools = tools.filter(|t| !t.is_empty())?;
    Some(
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": t
                })
            })
            .collect(),
    )
}

impl ChatApiProvider for OpenAIProvider {
    fn build_payload(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        parameters: Option<&TomlValue>,
    ) -> Result<Value> {
        let mut request_map = serde_json::Map::new();
        request_map.insert("model".to_string(), json!(model_name));
        request_map.insert("messages".to_string(), to_value(messages)?);

        if let Some(tools_json) = function_tools(tools) {
            request_map.insert("tools".to_string(), Value::Array(tools_json));
        }

        if let Some(parameters) = parameters.and_then(TomlValue::as_table) {
            for (key, value) in parameters {
                let json_value = to_value(value.clone()).with_context(|| {
                    format!("Failed to convert TOML parameter '{}' to JSON", key)
                })?;
                request_map.insert(key.clone(), json_value);
            }
        }
        Ok(Value::Object(request_map))
    }

    fn parse_response(&self, response_body: &str) -> Result<ApiResponse> {
        let response_value: Value = serde_json::from_str(response_body)
            .with_context(|| format!("Failed to parse OpenAI response: {}", response_body))?;

        let mut response_obj = match response_value {
            Value::Object(map) => map,
            other => return Err(anyhow!("API response was not a JSON object: {}", other)),
        };

        if !response_obj.contains_key("id") {
            let new_id = generate_id("chatcmpl");
            debug!(id = %new_id, "Added missing 'id' field to API response.");
            response_obj.insert("id".to_string(), json!(new_id));
        }

        let api_response: ApiResponse = serde_json::from_value(Value::Object(response_obj))
            .context("Failed to deserialize OpenAI response")?;

        if api_response.choices.is_empty() {
            return Err(anyhow!(
                "OpenAI response contained no choices: {}",
                response_body
            ));
        }
        Ok(api_response)
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if !self.api_key.is_empty() {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            );
        }
        headers
    }

    fn get_endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
