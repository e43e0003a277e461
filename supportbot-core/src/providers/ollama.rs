// supportbot-core/src/providers/ollama.rs
use super::Provider;
use crate::api::{self, ollama::OllamaProvider as OllamaDialect, CompletionRequest, RetryPolicy};
use crate::config::ModelConfig;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, trace};

pub struct OllamaProvider {
    config: ModelConfig,
    http_client: Client,
    dialect: OllamaDialect,
    retry: RetryPolicy,
}

impl OllamaProvider {
    pub fn new(config: ModelConfig, http_client: Client, retry: RetryPolicy) -> Self {
        let dialect = OllamaDialect::new(config.endpoint.clone());
        Self {
            config,
            http_client,
            dialect,
            retry,
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
        retry: &RetryPolicy,
    ) -> Result<ApiResponse> {
        trace!(model = %self.config.model_name, "Calling Ollama chat.");
        let request = CompletionRequest {
            model_name: &self.config.model_name,
            messages: &messages,
            tools,
            parameters: self.config.parameters.as_ref(),
        };
        let result =
            api::call_chat_completion_api(&self.http_client, &self.dialect, request, retry).await;
        if let Err(e) = &result {
            error!(error = %e, "Ollama chat failed.");
        }
        result
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    async fn get_completion(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        self.complete(messages, tools, &self.retry).await
    }

    async fn get_completion_once(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiResponse> {
        self.complete(messages, tools, &RetryPolicy::none()).await
    }
}
