//! Route handlers

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use atelier_catalog::{Product, ProductFilters};
use atelier_common::{AtelierError, SessionId};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::contact::ContactForm;
use super::{ApiResult, AppState};
use crate::domain::insights::SystemMetrics;
use crate::domain::state::ExperienceState;
use crate::infra::session_repository::SessionMetadata;
use crate::service::orchestrator::SessionOverview;
use crate::service::session_store::SessionUpdate;
use crate::STOREFRONT_VERSION;

// ============ HEALTH ============

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": STOREFRONT_VERSION,
        "sessions": state.storefront.sessions().stats().await,
    }))
}

// ============ SESSIONS ============

pub async fn create_session(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<SessionMetadata>)> {
    let metadata = state.storefront.start_session().await?;
    Ok((StatusCode::CREATED, Json(metadata)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionMetadata>> {
    Ok(Json(state.storefront.session(&SessionId::from(id)).await?))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> ApiResult<Json<SessionMetadata>> {
    let metadata = state
        .storefront
        .update_session(&SessionId::from(id), update)
        .await?;
    Ok(Json(metadata))
}

pub async fn session_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionOverview>> {
    Ok(Json(state.storefront.session_overview(&SessionId::from(id)).await?))
}

/// Free-form event submitted by a client
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

pub async fn record_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EventRequest>,
) -> ApiResult<Response> {
    let recorded = state
        .storefront
        .record_custom_event(
            &SessionId::from(id),
            &request.event_type,
            request.product_id,
            request.metadata,
        )
        .await?;

    Ok(match recorded {
        Some(experience) => Json(experience).into_response(),
        None => (StatusCode::ACCEPTED, Json(json!({ "ignored": true }))).into_response(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    /// Selected options for cart additions
    #[serde(default)]
    pub options: Map<String, Value>,
}

pub async fn product_action(
    State(state): State<AppState>,
    Path((id, product_id, action)): Path<(String, String, String)>,
    body: Option<Json<ActionRequest>>,
) -> ApiResult<Json<ExperienceState>> {
    let session_id = SessionId::from(id);
    let storefront = &state.storefront;

    let experience = match action.as_str() {
        "view" => storefront.view_product(&session_id, &product_id).await?,
        "detail" => storefront.open_product_detail(&session_id, &product_id).await?,
        "like" => storefront.like_product(&session_id, &product_id).await?,
        "cart" => {
            let options = body.map(|Json(request)| request.options).unwrap_or_default();
            storefront.add_to_cart(&session_id, &product_id, options).await?
        }
        "try-on" => storefront.start_virtual_try_on(&session_id, &product_id).await?,
        "share" => storefront.share_product(&session_id, &product_id).await?,
        _ => {
            return Err(AtelierError::NotFound {
                entity: "Action",
                id: action,
            }
            .into())
        }
    };

    Ok(Json(experience))
}

pub async fn checkout(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<ExperienceState>> {
    Ok(Json(state.storefront.checkout(&SessionId::from(id)).await?))
}

// ============ CATALOG ============

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma separated
    pub tags: Option<String>,
}

impl ProductQuery {
    fn filters(&self) -> Result<Option<ProductFilters>, AtelierError> {
        let mut filters = ProductFilters::new();

        if let Some(category) = non_empty(&self.category) {
            filters = filters.category(category);
        }
        if let Some(brand) = non_empty(&self.brand) {
            filters = filters.brand(brand);
        }

        let min = parse_price(&self.min_price, "min_price")?;
        let max = parse_price(&self.max_price, "max_price")?;
        if min.is_some() || max.is_some() {
            filters = filters.price_range(min.unwrap_or(Decimal::ZERO), max.unwrap_or(Decimal::MAX));
        }

        if let Some(tags) = non_empty(&self.tags) {
            for tag in tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                filters = filters.tag(tag);
            }
        }

        Ok((filters != ProductFilters::default()).then_some(filters))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(value: &Option<String>, field: &str) -> Result<Option<Decimal>, AtelierError> {
    non_empty(value)
        .map(|raw| {
            Decimal::from_str(raw)
                .map_err(|_| AtelierError::validation(format!("{field} must be a decimal number")))
        })
        .transpose()
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let filters = query.filters()?;
    Ok(Json(state.storefront.browse_catalog(filters.as_ref())))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub session_id: Option<String>,
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Product>> {
    // Searches are only attributed to live sessions
    let mut session_id = query.session_id.map(SessionId::from);
    if let Some(id) = &session_id {
        if state.storefront.engine().get_state(id).await.is_none() {
            session_id = None;
        }
    }
    Json(state.storefront.search(query.q.trim(), session_id.as_ref()))
}

pub async fn product_facets(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.storefront.catalog();
    Json(json!({
        "categories": catalog.categories(),
        "brands": catalog.brands(),
    }))
}

pub async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    Ok(Json(state.storefront.product(&id)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Json<Vec<Product>> {
    let user_id = query.user_id.as_deref().unwrap_or("anonymous");
    Json(state.storefront.recommendations(user_id, query.limit))
}

// ============ ANALYTICS ============

pub async fn metrics(State(state): State<AppState>) -> Json<SystemMetrics> {
    Json(state.storefront.system_metrics())
}

// ============ CONTACT ============

pub async fn contact(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(form) = body.map_err(|rejection| AtelierError::validation(rejection.body_text()))?;

    let client = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    state.contact.submit(client, form).await?;

    Ok(Json(json!({ "message": "Message sent successfully" })))
}

/// First `x-forwarded-for` hop, else the socket peer
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse().ok())
        .or_else(|| peer.map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::config::StorefrontConfig;
    use crate::service::orchestrator::StorefrontOrchestrator;
    use axum::{
        body::Body,
        http::{header, Method, Request},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = StorefrontConfig::default();
        let storefront = Arc::new(StorefrontOrchestrator::in_memory(&config));
        router(AppState::new(storefront, &config))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send_from(app, method, uri, body, None).await
    }

    async fn send_from(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        forwarded_for: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();
        let id = new_session(&app).await;

        let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());

        let (status, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/sessions/{id}"),
            Some(json!({ "preferences": { "size": "M" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preferences"]["size"], "M");

        let (status, body) = send(&app, Method::GET, "/api/sessions/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_product_actions() {
        let app = app();
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/products/dress-001/detail"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["experienceMode"], "detailed");
        assert_eq!(body["currentProduct"], "dress-001");

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/products/dress-001/cart"),
            Some(json!({ "options": { "size": "S" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cartItems"][0]["selectedOptions"]["size"], "S");

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/products/missing/like"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{id}/products/dress-001/dance"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::POST, &format!("/api/sessions/{id}/checkout"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["experienceMode"], "checkout");

        let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{id}/overview"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["personalization"]["preferredCategories"][0], "dresses");
    }

    #[tokio::test]
    async fn test_free_form_events() {
        let app = app();
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/events");

        let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "type": "wave" }))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["ignored"], true);

        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "type": "like", "productId": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorites"][0], "p1");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/sessions/ghost/events",
            Some(json!({ "type": "like", "productId": "p1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/products?category=shoes&max_price=100", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = send(&app, Method::GET, "/api/products?tags=denim,summer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = send(&app, Method::GET, "/api/products?min_price=cheap", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/products/search?q=SILK", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.as_array().unwrap().is_empty());

        let (status, body) = send(&app, Method::GET, "/api/products/dress-001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["brand"], "Maison Lune");

        let (status, _) = send(&app, Method::GET, "/api/products/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, "/api/products/facets", None).await;
        assert!(body["categories"].as_array().unwrap().contains(&json!("shoes")));

        let (_, body) = send(&app, Method::GET, "/api/recommendations?user_id=u1&limit=3", None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_metrics_route() {
        let app = app();
        for _ in 0..3 {
            let id = new_session(&app).await;
            send(
                &app,
                Method::POST,
                &format!("/api/sessions/{id}/products/shoes-001/view"),
                None,
            )
            .await;
        }

        let (status, body) = send(&app, Method::GET, "/api/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeSessions"], 3);
        assert_eq!(body["popularProducts"][0]["productId"], "shoes-001");
        assert_eq!(body["popularProducts"][0]["views"], 3);
    }

    #[tokio::test]
    async fn test_contact_validation_and_rate_limit() {
        let app = app();
        let valid = json!({ "name": "Ada", "email": "ada@example.com", "comment": "Hello" });

        let (status, body) = send_from(
            &app,
            Method::POST,
            "/api/contact",
            Some(json!({ "name": "Ada", "email": "not-an-email", "comment": "Hi" })),
            Some("203.0.113.7"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        // One attempt already counted against this client
        for _ in 0..4 {
            let (status, body) =
                send_from(&app, Method::POST, "/api/contact", Some(valid.clone()), Some("203.0.113.7")).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["message"].is_string());
        }

        let (status, body) =
            send_from(&app, Method::POST, "/api/contact", Some(valid.clone()), Some("203.0.113.7")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].is_string());

        let (status, _) =
            send_from(&app, Method::POST, "/api/contact", Some(valid), Some("203.0.113.8")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_client_ip() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)), peer.ip());
        assert_eq!(client_ip(&headers, None), IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        headers.insert("x-forwarded-for", "198.51.100.4, 10.0.0.1".parse().unwrap());
        assert_eq!(
            client_ip(&headers, Some(peer)),
            "198.51.100.4".parse::<IpAddr>().unwrap()
        );
    }
}
