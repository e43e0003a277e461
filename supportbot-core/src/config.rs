// supportbot-core/src/config.rs

//! Configuration structures and parsing for the support agent.
//!
//! Everything in `Support.toml` is optional; a missing file means the defaults
//! below. The model credential is never read from the file, only from the
//! environment variable named by `provider.api_key_env_var`.

use crate::errors::AgentError;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful and professional customer support agent for an e-commerce company.

Your capabilities:
- Answer questions about products, services, policies, and procedures
- Check order status and customer information
- Create support tickets for complex issues
- Search the knowledge base for information

Guidelines:
- Always be polite, professional, and helpful
- Use tools when you need specific information
- If an issue is too complex, create a support ticket
- Ask for clarification when needed
- Provide clear, actionable information

Available tools:
- search_knowledge_base: For policy and general information
- check_order_status: To check order status with order number
- create_support_ticket: For complex issues requiring human help
- get_customer_info: To retrieve customer data with email

Use tools when appropriate to provide accurate information.";

pub const DEFAULT_SUMMARY_PROMPT: &str = "Summarize this customer support conversation in 2-3 sentences, highlighting the main issue and resolution.";

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/chat";

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f64 = 0.0;
const DEFAULT_MAX_TOKENS: i64 = 1000;

#[derive(Deserialize, Debug, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_summary_prompt")]
    pub summary_prompt: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => DEFAULT_OPENAI_ENDPOINT,
            ProviderType::Ollama => DEFAULT_OLLAMA_ENDPOINT,
        }
    }

    /// Local Ollama servers run without credentials.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderType::OpenAI)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProviderConfig {
    // Use `type` in TOML, map to `provider_type`
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: ProviderType,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub model_config: ModelConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_parameters")]
    pub parameters: Option<toml::Value>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SessionConfig {
    /// User turns after which the session is summarized and closed.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    /// Tool dispatch rounds allowed within a single turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_show_tool_usage")]
    pub show_tool_usage: bool,
    /// Whole-line console commands that leave immediately.
    #[serde(default = "default_exit_commands")]
    pub exit_commands: Vec<String>,
    /// Phrases anywhere in a user message that end the conversation.
    #[serde(default = "default_termination_phrases")]
    pub termination_phrases: Vec<String>,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_summary_prompt() -> String {
    DEFAULT_SUMMARY_PROMPT.to_string()
}
fn default_provider_type() -> ProviderType {
    ProviderType::OpenAI
}
fn default_api_key_env_var() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_parameters() -> Option<toml::Value> {
    let mut table = toml::value::Table::new();
    table.insert("temperature".to_string(), toml::Value::Float(DEFAULT_TEMPERATURE));
    table.insert("max_tokens".to_string(), toml::Value::Integer(DEFAULT_MAX_TOKENS));
    Some(toml::Value::Table(table))
}
fn default_max_turns() -> usize {
    50
}
fn default_max_tool_rounds() -> usize {
    5
}
fn default_show_tool_usage() -> bool {
    true
}
fn default_exit_commands() -> Vec<String> {
    ["quit", "exit", "bye", "goodbye"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_termination_phrases() -> Vec<String> {
    ["goodbye", "bye", "thank you", "stop", "quit", "exit"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            summary_prompt: default_summary_prompt(),
            provider: ProviderConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            api_key_env_var: default_api_key_env_var(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            model_config: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            parameters: default_parameters(),
            endpoint: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_tool_rounds: default_max_tool_rounds(),
            show_tool_usage: default_show_tool_usage(),
            exit_commands: default_exit_commands(),
            termination_phrases: default_termination_phrases(),
        }
    }
}

impl ModelConfig {
    pub fn temperature(&self) -> Option<f64> {
        let value = self.parameters.as_ref()?.get("temperature")?;
        value.as_float().or_else(|| value.as_integer().map(|i| i as f64))
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        let mut table = match self.parameters.take() {
            Some(toml::Value::Table(table)) => table,
            _ => toml::value::Table::new(),
        };
        table.insert("temperature".to_string(), toml::Value::Float(temperature));
        self.parameters = Some(toml::Value::Table(table));
    }
}

/// Settings read from the process environment (after `.env` is loaded).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub debug: bool,
}

impl EnvOverrides {
    pub const MODEL_VAR: &'static str = "LLM_MODEL";
    pub const TEMPERATURE_VAR: &'static str = "LLM_TEMPERATURE";
    pub const DEBUG_VAR: &'static str = "DEBUG_MODE";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = lookup(Self::MODEL_VAR)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        let temperature = match lookup(Self::TEMPERATURE_VAR) {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<f64>().with_context(
                || format!("{} must be a number, got '{}'", Self::TEMPERATURE_VAR, raw),
            )?),
            _ => None,
        };
        let debug = lookup(Self::DEBUG_VAR)
            .map(|d| d.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Self {
            model,
            temperature,
            debug,
        })
    }
}

impl AgentConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<AgentConfig> {
        let config: AgentConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse TOML content");
                return Err(anyhow!(e))
                    .context("Failed to parse configuration TOML content. Check TOML syntax.");
            }
        };
        config.validate()?;
        tracing::info!("Successfully parsed and validated agent configuration.");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.system_prompt.trim().is_empty() {
            return Err(anyhow!("'system_prompt' in config content is empty."));
        }
        if self.summary_prompt.trim().is_empty() {
            return Err(anyhow!("'summary_prompt' in config content is empty."));
        }

        let provider = &self.provider;
        if provider.model_config.model_name.trim().is_empty() {
            return Err(anyhow!("Provider is missing 'model_config.model_name'."));
        }
        if provider.provider_type.requires_api_key() && provider.api_key_env_var.trim().is_empty() {
            return Err(anyhow!("Provider is missing 'api_key_env_var'."));
        }
        if let Some(endpoint) = &provider.model_config.endpoint {
            if endpoint.trim().is_empty() {
                return Err(anyhow!("Provider has an empty 'model_config.endpoint'."));
            }
            Url::parse(endpoint).with_context(|| {
                format!("Invalid URL format for endpoint ('{}').", endpoint)
            })?;
        }
        if let Some(params) = &provider.model_config.parameters {
            if !params.is_table() {
                return Err(anyhow!(
                    "Provider has invalid 'model_config.parameters'. Expected a TOML table."
                ));
            }
        }
        if provider.timeout_secs == 0 {
            return Err(anyhow!("'provider.timeout_secs' must be at least 1."));
        }

        if self.session.max_turns == 0 {
            return Err(anyhow!("'session.max_turns' must be at least 1."));
        }
        if self.session.max_tool_rounds == 0 {
            return Err(anyhow!("'session.max_tool_rounds' must be at least 1."));
        }
        if self.session.termination_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(anyhow!("'session.termination_phrases' contains an empty phrase."));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &EnvOverrides) {
        if let Some(model) = &overrides.model {
            tracing::debug!(model = %model, "Overriding model name.");
            self.provider.model_config.model_name = model.clone();
        }
        if let Some(temperature) = overrides.temperature {
            tracing::debug!(temperature, "Overriding sampling temperature.");
            self.provider.model_config.set_temperature(temperature);
        }
    }

    pub fn endpoint(&self) -> String {
        self.provider
            .model_config
            .endpoint
            .clone()
            .unwrap_or_else(|| self.provider.provider_type.default_endpoint().to_string())
    }

    /// Reads the model credential. A provider that needs one refuses to start
    /// without it.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Result<String, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = self.provider.api_key_env_var.trim();
        let key = if var.is_empty() {
            None
        } else {
            lookup(var).filter(|k| !k.trim().is_empty())
        };
        match key {
            Some(key) => Ok(key),
            None if self.provider.provider_type.requires_api_key() => {
                Err(AgentError::config(format!(
                    "{var} environment variable not set. Create a .env file containing {var}=your_api_key_here"
                )))
            }
            None => Ok(String::new()),
        }
    }
}
