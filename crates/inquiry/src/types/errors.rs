//! Error types for the inquiry flow.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for inquiry operations
pub type InquiryResult<T> = Result<T, InquiryError>;

/// Everything that can stop an inquiry from reaching the team's mailbox.
#[derive(Debug, Error)]
pub enum InquiryError {
    /// A required form field was left empty. Nothing was sent.
    #[error("{message}")]
    Validation { message: String },

    /// Mail credentials are missing. No connection was attempted.
    #[error("Email settings are incomplete (missing {missing}); check the .env file")]
    Configuration { missing: String },

    /// The SMTP exchange failed. Carries the transport's own description.
    #[error("{message}")]
    Transport { message: String },
}

impl InquiryError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error naming the missing settings
    pub fn configuration(missing: impl Into<String>) -> Self {
        Self::Configuration {
            missing: missing.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<TransportError> for InquiryError {
    fn from(error: TransportError) -> Self {
        Self::transport(error.to_string())
    }
}
