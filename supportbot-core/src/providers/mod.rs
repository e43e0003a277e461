// supportbot-core/src/providers/mod.rs
use crate::api::RetryPolicy;
use crate::config::{AgentConfig, ProviderType};
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

pub mod ollama;
pub mod openai;

/// A language-model service the agent can ask for completions.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Requests a completion, retrying transient failures as configured.
    async fn get_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse>;

    /// Requests a completion with a single attempt.
    async fn get_completion_once(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        self.get_completion(messages, tools).await
    }

    fn name(&self) -> &str;
}

/// Builds the configured provider. `api_key` may be empty for providers that
/// run without credentials.
pub fn from_config(config: &AgentConfig, api_key: String) -> Result<Box<dyn Provider>> {
    let provider_conf = &config.provider;
    let http_client = Client::builder()
        .timeout(Duration::from_secs(provider_conf.timeout_secs))
        .build()
        .context("Failed to build HTTP client for provider")?;
    let retry = RetryPolicy::new(provider_conf.max_retries);
    let model_config = provider_conf.model_config.clone();

    info!(
        provider = ?provider_conf.provider_type,
        model = %model_config.model_name,
        endpoint = %config.endpoint(),
        "Initializing model provider."
    );

    let provider: Box<dyn Provider> = match provider_conf.provider_type {
        ProviderType::OpenAI => Box::new(openai::OpenAIProvider::new(
            model_config,
            http_client,
            api_key,
            retry,
        )),
        ProviderType::Ollama => Box::new(ollama::OllamaProvider::new(
            model_config,
            http_client,
            retry,
        )),
    };
    Ok(provider)
}
