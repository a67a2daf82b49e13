//! Storefront Orchestrator
//!
//! Façade over catalog, sessions, engine, analytics and renderer. Every user
//! action runs the same sequence: domain check, record the engine event,
//! track the analytics event, render, return the updated state.

use std::sync::Arc;

use atelier_catalog::{Product, ProductCatalog, ProductFilters, StaticCatalog};
use atelier_common::{AtelierError, Result, SessionId};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::analytics::AnalyticsTracker;
use super::engine::ExperienceEngine;
use super::janitor::SessionJanitor;
use super::renderer::{ExperienceRenderer, Scene, TracingRenderer};
use super::session_store::{SessionStore, SessionUpdate};
use crate::config::StorefrontConfig;
use crate::domain::analytics::{event_types, AnalyticsEvent};
use crate::domain::event::{EventKind, ExperienceEvent, OPTIONS_KEY};
use crate::domain::insights::{SessionInsights, SystemMetrics};
use crate::domain::personalization::PersonalizedExperience;
use crate::domain::state::{ExperienceMode, ExperienceState, StateUpdate};
use crate::infra::session_repository::{InMemorySessionRepository, SessionMetadata};

/// Everything known about one session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOverview {
    pub metadata: SessionMetadata,
    pub state: ExperienceState,
    pub insights: SessionInsights,
    pub personalization: PersonalizedExperience,
}

/// Analytics event type tracked for an engine event kind
pub fn analytics_type(kind: EventKind) -> &'static str {
    match kind {
        EventKind::View => event_types::PRODUCT_VIEW,
        EventKind::Like => event_types::PRODUCT_LIKE,
        EventKind::AddToCart => event_types::ADD_TO_CART,
        EventKind::TryVirtual => event_types::VIRTUAL_TRY_ON,
        EventKind::Share => event_types::PRODUCT_SHARE,
    }
}

/// Storefront façade
pub struct StorefrontOrchestrator {
    catalog: Arc<dyn ProductCatalog>,
    sessions: Arc<SessionStore>,
    engine: Arc<ExperienceEngine>,
    analytics: Arc<AnalyticsTracker>,
    renderer: Arc<dyn ExperienceRenderer>,
    recommendation_limit: usize,
}

impl StorefrontOrchestrator {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        sessions: Arc<SessionStore>,
        engine: Arc<ExperienceEngine>,
        analytics: Arc<AnalyticsTracker>,
        renderer: Arc<dyn ExperienceRenderer>,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            catalog,
            sessions,
            engine,
            analytics,
            renderer,
            recommendation_limit,
        }
    }

    /// Demo catalog and in-memory sessions sharing one repository
    pub fn in_memory(config: &StorefrontConfig) -> Self {
        let repository = Arc::new(InMemorySessionRepository::new(config.sessions.max_sessions));

        Self::new(
            Arc::new(StaticCatalog::demo()),
            Arc::new(SessionStore::new(repository.clone(), config.sessions.max_age())),
            Arc::new(ExperienceEngine::new(repository)),
            Arc::new(AnalyticsTracker::new()),
            Arc::new(TracingRenderer::new()),
            config.catalog.default_recommendation_limit,
        )
    }

    /// Janitor sweeping this storefront's sessions and analytics
    pub fn janitor(&self, interval: std::time::Duration) -> SessionJanitor {
        SessionJanitor::new(self.sessions.clone(), self.analytics.clone(), interval)
    }

    pub fn catalog(&self) -> &Arc<dyn ProductCatalog> {
        &self.catalog
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn engine(&self) -> &Arc<ExperienceEngine> {
        &self.engine
    }

    pub fn analytics(&self) -> &Arc<AnalyticsTracker> {
        &self.analytics
    }

    // ---- Sessions ----

    /// Open a new shopping session
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> Result<SessionMetadata> {
        let metadata = self.sessions.create().await?;
        let evicted = self.sessions.drain_evicted().await;
        self.analytics.forget_sessions(&evicted);
        self.analytics
            .track(AnalyticsEvent::new(event_types::SESSION_START, metadata.id.clone()));

        if let Some(state) = self.engine.get_state(&metadata.id).await {
            self.renderer.render(Scene::Gallery, &state, None);
        }

        info!(session_id = %metadata.id, "Shopping session started");
        Ok(metadata)
    }

    /// Session metadata, refreshing its activity
    pub async fn session(&self, session_id: &SessionId) -> Result<SessionMetadata> {
        self.sessions
            .get(session_id)
            .await
            .ok_or_else(|| AtelierError::session_not_found(session_id.as_str()))
    }

    /// Replace session preferences
    pub async fn update_session(&self, session_id: &SessionId, update: SessionUpdate) -> Result<SessionMetadata> {
        self.sessions.update(session_id, update).await
    }

    /// State, insights and personalization for one session
    #[instrument(skip(self))]
    pub async fn session_overview(&self, session_id: &SessionId) -> Result<SessionOverview> {
        let metadata = self.session(session_id).await?;
        let state = self
            .engine
            .get_state(session_id)
            .await
            .ok_or_else(|| AtelierError::session_not_found(session_id.as_str()))?;
        let personalization = self.engine.get_personalized_experience(session_id).await?;
        let insights = self.analytics.get_insights(session_id);

        Ok(SessionOverview {
            metadata,
            state,
            insights,
            personalization,
        })
    }

    // ---- Catalog ----

    /// Products matching the filters
    pub fn browse_catalog(&self, filters: Option<&ProductFilters>) -> Vec<Product> {
        self.catalog.get_products(filters)
    }

    /// Full-text search; tracked against the session when one is given
    pub fn search(&self, query: &str, session_id: Option<&SessionId>) -> Vec<Product> {
        let results = self.catalog.search_products(query);

        if let Some(session_id) = session_id {
            self.analytics.track(
                AnalyticsEvent::new(event_types::CATALOG_SEARCH, session_id.clone())
                    .with_data("query", query)
                    .with_data("results", results.len()),
            );
        }

        results
    }

    pub fn product(&self, product_id: &str) -> Result<Product> {
        self.catalog
            .get_product(product_id)
            .ok_or_else(|| AtelierError::product_not_found(product_id))
    }

    /// Recommendations for a user; falls back to the configured limit
    pub fn recommendations(&self, user_id: &str, limit: Option<usize>) -> Vec<Product> {
        self.catalog
            .get_recommendations(user_id, limit.unwrap_or(self.recommendation_limit))
    }

    // ---- Product actions ----

    /// Record a product view
    pub async fn view_product(&self, session_id: &SessionId, product_id: &str) -> Result<ExperienceState> {
        let product = self.product(product_id)?;
        let state = self
            .record_product_event(session_id, &product, ExperienceEvent::view(&product.id))
            .await?;

        self.renderer
            .render(Scene::for_mode(state.experience_mode), &state, Some(&product));
        Ok(state)
    }

    /// View a product and focus it in the detail view
    #[instrument(skip(self))]
    pub async fn open_product_detail(&self, session_id: &SessionId, product_id: &str) -> Result<ExperienceState> {
        let product = self.product(product_id)?;
        self.record_product_event(session_id, &product, ExperienceEvent::view(&product.id))
            .await?;

        let state = self
            .engine
            .update_state(
                session_id,
                StateUpdate::new()
                    .current_product(&product.id)
                    .mode(ExperienceMode::Detailed),
            )
            .await?;
        self.track_product(session_id, event_types::PRODUCT_DETAIL_VIEW, &product);

        self.renderer.render(Scene::ProductDetail, &state, Some(&product));
        Ok(state)
    }

    /// Add a product to favorites
    pub async fn like_product(&self, session_id: &SessionId, product_id: &str) -> Result<ExperienceState> {
        let product = self.product(product_id)?;
        let state = self
            .record_product_event(session_id, &product, ExperienceEvent::like(&product.id))
            .await?;

        self.renderer
            .render(Scene::for_mode(state.experience_mode), &state, Some(&product));
        Ok(state)
    }

    /// Add one unit of a product to the cart
    #[instrument(skip(self, options))]
    pub async fn add_to_cart(
        &self,
        session_id: &SessionId,
        product_id: &str,
        options: Map<String, Value>,
    ) -> Result<ExperienceState> {
        let product = self.product(product_id)?;

        let mut event = ExperienceEvent::add_to_cart(&product.id);
        if !options.is_empty() {
            event = event.with_metadata(OPTIONS_KEY, Value::Object(options));
        }
        let state = self.record_product_event(session_id, &product, event).await?;

        self.renderer.render(Scene::Cart, &state, Some(&product));
        Ok(state)
    }

    /// Enter virtual try-on focused on a product
    #[instrument(skip(self))]
    pub async fn start_virtual_try_on(&self, session_id: &SessionId, product_id: &str) -> Result<ExperienceState> {
        let product = self.product(product_id)?;
        self.record_product_event(session_id, &product, ExperienceEvent::try_virtual(&product.id))
            .await?;

        // The transition clears the focus; refocus on the product being tried
        let state = self
            .engine
            .update_state(session_id, StateUpdate::new().current_product(&product.id))
            .await?;

        let receipt = self.renderer.render(Scene::VirtualTryOn, &state, Some(&product));
        if !receipt.ar_enabled {
            debug!(product_id = %product.id, "Product has no AR assets, showing static try-on");
        }
        Ok(state)
    }

    /// Share a product
    pub async fn share_product(&self, session_id: &SessionId, product_id: &str) -> Result<ExperienceState> {
        let product = self.product(product_id)?;
        let state = self
            .record_product_event(session_id, &product, ExperienceEvent::share(&product.id))
            .await?;

        self.renderer
            .render(Scene::for_mode(state.experience_mode), &state, Some(&product));
        Ok(state)
    }

    /// Move the session to checkout
    #[instrument(skip(self))]
    pub async fn checkout(&self, session_id: &SessionId) -> Result<ExperienceState> {
        let state = self
            .engine
            .update_state(session_id, StateUpdate::new().mode(ExperienceMode::Checkout))
            .await?;

        self.analytics.track(
            AnalyticsEvent::new(event_types::CHECKOUT_START, session_id.clone())
                .with_data("cartLines", state.cart_items.len())
                .with_data("cartUnits", state.cart_units()),
        );

        self.renderer.render(Scene::Checkout, &state, None);
        Ok(state)
    }

    /// Record an event named by a free-form type string.
    ///
    /// Returns `Ok(None)` when the type is not a known event kind; the
    /// session must exist either way.
    #[instrument(skip(self, metadata))]
    pub async fn record_custom_event(
        &self,
        session_id: &SessionId,
        event_type: &str,
        product_id: Option<String>,
        metadata: Map<String, Value>,
    ) -> Result<Option<ExperienceState>> {
        if self.engine.get_state(session_id).await.is_none() {
            return Err(AtelierError::session_not_found(session_id.as_str()));
        }

        let Some(kind) = EventKind::parse(event_type) else {
            debug!(event_type, "Ignoring unknown event type");
            return Ok(None);
        };

        let mut event = match product_id {
            Some(product_id) => ExperienceEvent::for_product(kind, product_id),
            None => ExperienceEvent::new(kind),
        };
        event.metadata = metadata;

        let mut tracked = AnalyticsEvent::new(analytics_type(kind), session_id.clone());
        if let Some(product_id) = &event.product_id {
            tracked = tracked.with_data(crate::domain::analytics::PRODUCT_ID_KEY, product_id.as_str());
        }
        if let Some(category) = event.category() {
            tracked = tracked.with_data(crate::domain::analytics::CATEGORY_KEY, category);
        }

        let state = self.engine.record_event(session_id, event).await?;
        self.analytics.track(tracked);

        let product = state
            .current_product
            .as_deref()
            .and_then(|id| self.catalog.get_product(id));
        self.renderer
            .render(Scene::for_mode(state.experience_mode), &state, product.as_ref());

        Ok(Some(state))
    }

    /// System-wide analytics
    pub fn system_metrics(&self) -> SystemMetrics {
        self.analytics.get_metrics()
    }

    // ---- Helpers ----

    /// Record an engine event tagged with the product's category, then track it
    async fn record_product_event(
        &self,
        session_id: &SessionId,
        product: &Product,
        event: ExperienceEvent,
    ) -> Result<ExperienceState> {
        let kind = event.kind;
        let state = self
            .engine
            .record_event(session_id, event.with_category(&product.category))
            .await?;

        self.track_product(session_id, analytics_type(kind), product);
        Ok(state)
    }

    fn track_product(&self, session_id: &SessionId, event_type: &str, product: &Product) {
        self.analytics.track(
            AnalyticsEvent::new(event_type, session_id.clone()).with_product(&product.id, &product.category),
        );
    }
}
