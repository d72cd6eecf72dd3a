//! The email composed for each inquiry.

use serde::Serialize;

use super::inquiry::InquiryRequest;

const SUBJECT_PREFIX: &str = "[Vercup Inquiry]";

/// A single plain-text email, built right before transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailNotification {
    pub sender: String,
    pub recipient: String,
    /// The visitor's address, so the team can answer with a plain reply.
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

impl EmailNotification {
    pub fn compose(
        request: &InquiryRequest,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        let category = request.category().label();

        let subject = format!("{SUBJECT_PREFIX} {category} - {}", request.name());
        let body = format!(
            "A new inquiry was submitted through the Vercup website.\n\
             \n\
             - Name / Company: {name}\n\
             - Email: {email}\n\
             - Category: {category}\n\
             \n\
             [Message]\n\
             {message}\n",
            name = request.name(),
            email = request.sender_email(),
            message = request.message(),
        );

        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            reply_to: Some(request.sender_email().trim().to_string()),
            subject,
            body,
        }
    }
}
