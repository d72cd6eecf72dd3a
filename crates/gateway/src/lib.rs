//! # Vercup Gateway Crate
//!
//! HTTP surface for the Vercup site: the partnership/contact form and the
//! chat assistant, whose answers are streamed as server-sent events.
//!
//! ## Architecture
//!
//! - **REST**: JSON endpoints with OpenAPI documentation
//! - **State**: shared services plus the in-memory chat session store
//! - **Middleware**: CORS and request logging
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vercup_gateway::{create_router, GatewayState};
//! # use vercup_inquiry::InquiryNotifier;
//!
//! # async fn run(notifier: Arc<InquiryNotifier>) -> std::io::Result<()> {
//! let state = GatewayState::new(notifier, None, Duration::from_secs(30 * 60));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8501").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;

pub use error::{ErrorResponse, GatewayError, GatewayResult};
pub use state::{GatewayState, SessionStore, SharedSession};

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let arc_state = Arc::new(state);
    #[allow(unused_mut)]
    let mut router = Router::new()
        .merge(rest::create_rest_routes().with_state(arc_state))
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    // Add Swagger UI if in debug mode
    #[cfg(debug_assertions)]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health_check,
                rest::inquiry::list_categories,
                rest::inquiry::submit_inquiry,
                rest::chat::create_session,
                rest::chat::get_session,
                rest::chat::delete_session,
                rest::chat::send_message,
            ),
            components(
                schemas(
                    rest::health::HealthResponse,
                    rest::inquiry::CategoryResponse,
                    rest::inquiry::SubmitInquiryRequest,
                    rest::inquiry::InquiryAcceptedResponse,
                    rest::chat::ChatTurnResponse,
                    rest::chat::ChatSessionResponse,
                    rest::chat::SendMessageRequest,
                    error::ErrorResponse,
                )
            ),
            tags(
                (name = "Health", description = "Service status"),
                (name = "Inquiries", description = "Partnership and contact form"),
                (name = "Chat", description = "Knowledge-grounded chat assistant"),
            )
        )]
        struct ApiDoc;

        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
}
