//! REST API
//!
//! axum router exposing the storefront orchestrator and the contact relay.

pub mod contact;
pub mod rate_limit;
pub mod routes;

use std::sync::Arc;

use atelier_common::AtelierError;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::config::StorefrontConfig;
use crate::service::orchestrator::StorefrontOrchestrator;
use contact::ContactRelay;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub storefront: Arc<StorefrontOrchestrator>,
    pub contact: Arc<ContactRelay>,
}

impl AppState {
    pub fn new(storefront: Arc<StorefrontOrchestrator>, config: &StorefrontConfig) -> Self {
        Self {
            storefront,
            contact: Arc::new(ContactRelay::new(&config.contact)),
        }
    }
}

/// Error returned by handlers, rendered as `{ "error": message }`
#[derive(Debug)]
pub struct ApiError(pub AtelierError);

impl From<AtelierError> for ApiError {
    fn from(err: AtelierError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AtelierError::NotFound { .. } => StatusCode::NOT_FOUND,
            AtelierError::Validation(_) => StatusCode::BAD_REQUEST,
            AtelierError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        let mut response = (status, body).into_response();

        if let AtelierError::RateLimited { retry_after_secs } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the storefront router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        // Health
        .route("/health", get(routes::health))
        // Sessions
        .route("/api/sessions", post(routes::create_session))
        .route(
            "/api/sessions/:id",
            get(routes::get_session).patch(routes::update_session),
        )
        .route("/api/sessions/:id/overview", get(routes::session_overview))
        .route("/api/sessions/:id/events", post(routes::record_event))
        .route(
            "/api/sessions/:id/products/:product_id/:action",
            post(routes::product_action),
        )
        .route("/api/sessions/:id/checkout", post(routes::checkout))
        // Catalog
        .route("/api/products", get(routes::list_products))
        .route("/api/products/search", get(routes::search_products))
        .route("/api/products/facets", get(routes::product_facets))
        .route("/api/products/:id", get(routes::get_product))
        .route("/api/recommendations", get(routes::recommendations))
        // Analytics
        .route("/api/metrics", get(routes::metrics))
        // Contact
        .route("/api/contact", post(routes::contact))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
