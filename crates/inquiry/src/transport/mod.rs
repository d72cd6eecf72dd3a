//! Outbound mail delivery.

mod smtp;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::EmailNotification;

pub use smtp::SmtpMailTransport;

/// Login for the sending mailbox.
#[derive(Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Failure reported by a [`MailTransport`], described in the transport's own words.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delivers one email per call. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        credentials: &MailCredentials,
        notification: &EmailNotification,
    ) -> Result<(), TransportError>;
}
