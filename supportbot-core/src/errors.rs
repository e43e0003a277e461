// supportbot-core/src/errors.rs
use thiserror::Error;

/// Errors that can occur while running a support session.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Error related to configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error during interaction with the language-model service.
    #[error("API Error: {0}")]
    Api(#[source] anyhow::Error),

    /// Error originating from the conversation strategy.
    #[error("Strategy Error: {0}")]
    Strategy(String),

    /// Input arrived after the session reached its terminal state.
    #[error("Session is closed")]
    SessionClosed,

    /// Error while reading input or showing output.
    #[error("User Interaction Error: {0}")]
    Ui(#[source] anyhow::Error),
}

impl AgentError {
    pub fn config(msg: impl Into<String>) -> Self {
        AgentError::Config(msg.into())
    }

    /// The underlying message without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            AgentError::Config(msg) | AgentError::Strategy(msg) => msg.clone(),
            AgentError::Api(e) | AgentError::Ui(e) => e.to_string(),
            AgentError::SessionClosed => self.to_string(),
        }
    }
}
