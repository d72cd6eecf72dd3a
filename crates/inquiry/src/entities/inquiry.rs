//! Inquiry entities and form validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{InquiryError, InquiryResult};

/// Kind of inquiry offered by the contact form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryCategory {
    #[default]
    SampleRequest,
    BulkPurchase,
    FarmPartnership,
    Investment,
    Other,
}

impl InquiryCategory {
    /// Every category in the order the form presents them. The first is the default.
    pub const ALL: [InquiryCategory; 5] = [
        InquiryCategory::SampleRequest,
        InquiryCategory::BulkPurchase,
        InquiryCategory::FarmPartnership,
        InquiryCategory::Investment,
        InquiryCategory::Other,
    ];

    /// Human readable label used in emails and on the form.
    pub fn label(&self) -> &'static str {
        match self {
            InquiryCategory::SampleRequest => "Sample Request",
            InquiryCategory::BulkPurchase => "Bulk Purchase",
            InquiryCategory::FarmPartnership => "Farm Partnership",
            InquiryCategory::Investment => "Investment",
            InquiryCategory::Other => "Other",
        }
    }

    /// Wire identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryCategory::SampleRequest => "sample_request",
            InquiryCategory::BulkPurchase => "bulk_purchase",
            InquiryCategory::FarmPartnership => "farm_partnership",
            InquiryCategory::Investment => "investment",
            InquiryCategory::Other => "other",
        }
    }
}

impl fmt::Display for InquiryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InquiryCategory {
    type Err = InquiryError;

    /// Accepts either the wire identifier or the label, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.as_str().eq_ignore_ascii_case(value)
                    || category.label().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| InquiryError::validation(format!("Unknown inquiry category: {value}")))
    }
}

/// Raw contact-form submission as it arrives from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "email")]
    pub sender_email: String,
    #[serde(default)]
    pub category: Option<InquiryCategory>,
    #[serde(default)]
    pub message: String,
}

impl InquiryForm {
    /// Check the required fields and produce a request the notifier accepts.
    ///
    /// Name, email and message must contain something other than whitespace.
    /// Values are kept exactly as submitted. A missing category falls back to
    /// the first option.
    pub fn validate(self) -> InquiryResult<InquiryRequest> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("email", &self.sender_email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(InquiryError::validation(format!(
                "Please fill in all required fields ({})",
                missing.join(", ")
            )));
        }

        Ok(InquiryRequest {
            name: self.name,
            sender_email: self.sender_email,
            category: self.category.unwrap_or_default(),
            message: self.message,
        })
    }
}

/// A validated inquiry. Only [`InquiryForm::validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryRequest {
    name: String,
    sender_email: String,
    category: InquiryCategory,
    message: String,
}

impl InquiryRequest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sender_email(&self) -> &str {
        &self.sender_email
    }

    pub fn category(&self) -> InquiryCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
