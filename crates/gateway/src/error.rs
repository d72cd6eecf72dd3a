//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use vercup_assistant::AssistantError;
use vercup_inquiry::InquiryError;

/// Gateway error types. The display text is shown to the visitor as-is.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: status.as_str().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<InquiryError> for GatewayError {
    fn from(error: InquiryError) -> Self {
        match error {
            InquiryError::Validation { message } => GatewayError::InvalidRequest(message),
            InquiryError::Configuration { .. } => GatewayError::ServiceUnavailable(error.to_string()),
            InquiryError::Transport { message } => GatewayError::Upstream(message),
        }
    }
}

impl From<AssistantError> for GatewayError {
    fn from(error: AssistantError) -> Self {
        match error {
            AssistantError::Configuration { .. } => {
                GatewayError::ServiceUnavailable(error.to_string())
            }
            AssistantError::EmptyInput => GatewayError::InvalidRequest(error.to_string()),
            AssistantError::RoundInProgress => GatewayError::Conflict(error.to_string()),
            AssistantError::Model { .. } => GatewayError::Upstream(error.to_string()),
            AssistantError::Knowledge { .. } => GatewayError::InternalError(error.to_string()),
        }
    }
}
