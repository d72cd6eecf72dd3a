//! In-memory [`MailTransport`] for tests in this and dependent crates.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::entities::EmailNotification;
use crate::transport::{MailCredentials, MailTransport, TransportError};

/// Records every delivery attempt and answers with a canned outcome.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<EmailNotification>>>,
    failure: Option<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every attempt fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// Every notification handed to the transport, successful or not.
    pub fn attempts(&self) -> Vec<EmailNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(
        &self,
        _credentials: &MailCredentials,
        notification: &EmailNotification,
    ) -> Result<(), TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        match &self.failure {
            Some(message) => Err(TransportError::new(message.clone())),
            None => Ok(()),
        }
    }
}
