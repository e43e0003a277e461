// supportbot-core/src/providers/openai.rs
use super::Provider;
use crate::api::{self, openai::OpenAIProvider as OpenAIDialect, CompletionRequest, RetryPolicy};
use crate::config::ModelConfig;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, trace};

pub struct OpenAIProvider {
    config: ModelConfig,
    http_client: Client,
    dialect: OpenAIDialect,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    pub fn new(config: ModelConfig, http_client: Client, api_key: String, retry: RetryPolicy) -> Self {
        let dialect = OpenAIDialect::new(api_key, config.endpoint.clone());
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
        trace!(model = %self.config.model_name, "Calling OpenAI chat completion.");
        let request = CompletionRequest {
            model_name: &self.config.model_name,
            messages: &messages,
            tools,
            parameters: self.config.parameters.as_ref(),
        };
        let result =
            api::call_chat_completion_api(&self.http_client, &self.dialect, request, retry).await;
        if let Err(e) = &result {
            error!(error = %e, "OpenAI chat completion failed.");
        }
        result
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
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
