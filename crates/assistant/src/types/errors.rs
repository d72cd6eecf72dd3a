//! Error types for the chat assistant.

use thiserror::Error;

/// Result type alias for assistant operations
pub type AssistantResult<T> = Result<T, AssistantError>;

#[derive(Debug, Error)]
pub enum AssistantError {
    /// The completion endpoint credential is missing; the chat loop never starts.
    #[error("Chat is disabled: {message}")]
    Configuration { message: String },

    #[error("Message must not be empty")]
    EmptyInput,

    #[error("A reply is still being generated for this session")]
    RoundInProgress,

    /// Contacting or streaming from the completion endpoint failed.
    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Knowledge document error: {message}")]
    Knowledge { message: String },
}

impl AssistantError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    pub fn knowledge(message: impl Into<String>) -> Self {
        Self::Knowledge {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(error: reqwest::Error) -> Self {
        Self::model(error.to_string())
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(error: serde_json::Error) -> Self {
        Self::model(format!("malformed completion payload: {error}"))
    }
}
