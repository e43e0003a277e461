// supportbot-core/src/api/mod.rs
//! HTTP plumbing for chat-completion services.
//!
//! A [`ChatApiProvider`] knows one service dialect (payload shape, headers,
//! response format); [`call_chat_completion_api`] does the request and the
//! retry loop for any of them.

use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;
use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tokio::time::Duration;
use toml::Value as TomlValue;
use tracing::{debug, trace, warn};
use uuid::Uuid;

pub mod ollama;
pub mod openai;

pub trait ChatApiProvider: Send + Sync {
    /// Builds the request payload for the specific API provider
    fn build_payload(
        &self,
        model_name: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
        parameters: Option<&TomlValue>,
    ) -> Result<Value>;

    /// Parses the API response into our common ApiResponse format
    fn parse_response(&self, response_body: &str) -> Result<ApiResponse>;

    /// Builds the headers for the API request
    fn build_headers(&self) -> HashMap<String, String>;

    /// Gets the endpoint URL for the API request
    fn get_endpoint(&self) -> String;
}

/// What to ask for in one completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model_name: &'a str,
    pub messages: &'a [ChatMessage],
    pub tools: Option<&'a [ToolDefinition]>,
    pub parameters: Option<&'a TomlValue>,
}

/// Exponential back-off for transient failures (network errors, 429, 5xx).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    const INITIAL_DELAY: Duration = Duration::from_secs(1);
    const MAX_DELAY: Duration = Duration::from_secs(60);

    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Self::INITIAL_DELAY,
            max_delay: Self::MAX_DELAY,
            backoff_factor: 2.0,
        }
    }

    /// Single attempt.
    pub fn none() -> Self {
        Self::new(0)
    }

    fn next_delay(&self, current: Duration) -> Duration {
        std::cmp::min(
            Duration::from_secs_f64(current.as_secs_f64() * self.backoff_factor),
            self.max_delay,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Id for responses or tool calls the service left unnamed.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

fn header_map(headers: HashMap<String, String>) -> HeaderMap {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(val)) => {
                header_map.insert(name, val);
            }
            _ => warn!(header = %key, "Skipping invalid request header."),
        }
    }
    header_map
}

/// Generic function to make a request to an AI chat completion API
pub async fn call_chat_completion_api(
    http_client: &Client,
    provider: &dyn ChatApiProvider,
    request: CompletionRequest<'_>,
    retry: &RetryPolicy,
) -> Result<ApiResponse> {
    let endpoint = provider.get_endpoint();
    let payload = provider.build_payload(
        request.model_name,
        request.messages,
        request.tools,
        request.parameters,
    )?;
    let headers = header_map(provider.build_headers());

    debug!(
        endpoint = %endpoint,
        model = %request.model_name,
        num_messages = request.messages.len(),
        num_tools = request.tools.map_or(0, |t| t.len()),
        "Sending chat completion request."
    );
    trace!(payload = %serde_json::to_string_pretty(&payload).unwrap_or_default(), "Request payload");

    let mut retries = 0;
    let mut current_delay = retry.initial_delay;

    loop {
        let response_result = http_client
            .post(&endpoint)
            .headers(headers.clone())
            .json(&payload)
            .send()
            .await;

        let response = match response_result {
            Ok(resp) => resp,
            Err(e) => {
                if retries < retry.max_retries {
                    retries += 1;
                    warn!(
                        "Network error sending request: {}. Retrying in {:?} (attempt {}/{})",
                        e, current_delay, retries, retry.max_retries
                    );
                    tokio::time::sleep(current_delay).await;
                    current_delay = retry.next_delay(current_delay);
                    continue;
                }
                return Err(anyhow!(
                    "Network error after {} retries: {}",
                    retry.max_retries,
                    e
                ));
            }
        };

        let status = response.status();

        if (status.as_u16() == 429 || status.is_server_error()) && retries < retry.max_retries {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);

            // Server hints never wait longer than the policy allows.
            let wait_time = retry_after.unwrap_or(current_delay).min(retry.max_delay);
            retries += 1;
            warn!(
                "API request failed with status {}. Retrying in {:?} (attempt {}/{})",
                status, wait_time, retries, retry.max_retries
            );
            tokio::time::sleep(wait_time).await;
            current_delay = retry.next_delay(current_delay);
            continue;
        }

        let response_text = response
            .text()
            .await
            .context("Failed to read API response body")?;

        if !status.is_success() {
            debug!(status = %status, body = %response_text, "API request failed.");
            return Err(anyhow!("API error: {} - {}", status, response_text));
        }

        trace!(body = %response_text, "Response body");
        return provider.parse_response(&response_text);
    }
}
