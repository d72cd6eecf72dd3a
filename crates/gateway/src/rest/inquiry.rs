//! Contact form endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vercup_inquiry::{InquiryCategory, InquiryForm};

use crate::error::{ErrorResponse, GatewayResult};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub label: String,
    pub default: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitInquiryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Category id or label. Falls back to the first category when omitted.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SubmitInquiryRequest {
    fn into_form(self) -> GatewayResult<InquiryForm> {
        let category = self
            .category
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<InquiryCategory>())
            .transpose()?;

        Ok(InquiryForm {
            name: self.name,
            sender_email: self.email,
            category,
            message: self.message,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryAcceptedResponse {
    pub status: String,
    pub message: String,
}

pub fn create_inquiry_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/inquiries", routing::post(submit_inquiry))
        .route("/api/inquiries/categories", routing::get(list_categories))
}

#[utoipa::path(
    get,
    path = "/api/inquiries/categories",
    tag = "Inquiries",
    responses(
        (status = 200, description = "Inquiry categories in form order", body = Vec<CategoryResponse>)
    )
)]
pub async fn list_categories() -> Json<Vec<CategoryResponse>> {
    let categories = InquiryCategory::ALL
        .into_iter()
        .map(|category| CategoryResponse {
            id: category.as_str().to_string(),
            label: category.label().to_string(),
            default: category == InquiryCategory::default(),
        })
        .collect();

    Json(categories)
}

#[utoipa::path(
    post,
    path = "/api/inquiries",
    tag = "Inquiries",
    request_body = SubmitInquiryRequest,
    responses(
        (status = 202, description = "Inquiry forwarded to the team", body = InquiryAcceptedResponse),
        (status = 400, description = "Required fields missing", body = ErrorResponse),
        (status = 502, description = "Mail server rejected the message", body = ErrorResponse),
        (status = 503, description = "Email settings are incomplete", body = ErrorResponse)
    )
)]
pub async fn submit_inquiry(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<SubmitInquiryRequest>,
) -> GatewayResult<impl IntoResponse> {
    let form = payload.into_form()?;
    let request = state.notifier.submit(form).await?;

    let response = InquiryAcceptedResponse {
        status: "sent".to_string(),
        message: format!(
            "감사합니다, {}님! 소중한 문의가 정상적으로 접수되었습니다.",
            request.name()
        ),
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(category: Option<&str>) -> SubmitInquiryRequest {
        SubmitInquiryRequest {
            name: "Hong Gildong".to_string(),
            email: "x@y.com".to_string(),
            category: category.map(str::to_string),
            message: "Please send a sample".to_string(),
        }
    }

    #[test]
    fn category_accepts_label_or_id() {
        let form = payload(Some("Bulk Purchase")).into_form().unwrap();
        assert_eq!(form.category, Some(InquiryCategory::BulkPurchase));

        let form = payload(Some("farm_partnership")).into_form().unwrap();
        assert_eq!(form.category, Some(InquiryCategory::FarmPartnership));
    }

    #[test]
    fn blank_category_is_left_for_the_default() {
        let form = payload(Some("  ")).into_form().unwrap();
        assert_eq!(form.category, None);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(payload(Some("Franchise")).into_form().is_err());
    }
}
