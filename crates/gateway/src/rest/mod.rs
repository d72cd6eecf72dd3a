//! REST API endpoints for the gateway

pub mod chat;
pub mod health;
pub mod inquiry;

use std::sync::Arc;

use axum::{routing, Router};

use crate::state::GatewayState;

/// Create all REST API routes
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", routing::get(health::health_check))
        // Contact form
        .merge(inquiry::create_inquiry_routes())
        // Chat assistant
        .merge(chat::create_chat_routes())
}
