//! Visual Renderer
//!
//! Log-only stand-in for the rendering pipeline. Renderers receive the
//! current state and the product in focus and report what they drew.

use std::sync::atomic::{AtomicU64, Ordering};

use atelier_catalog::Product;
use atelier_common::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::state::{ExperienceMode, ExperienceState};

/// What is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scene {
    Gallery,
    ProductDetail,
    VirtualTryOn,
    Cart,
    Checkout,
}

impl Scene {
    /// Scene matching a session's experience mode
    pub fn for_mode(mode: ExperienceMode) -> Self {
        match mode {
            ExperienceMode::Browse => Scene::Gallery,
            ExperienceMode::Detailed => Scene::ProductDetail,
            ExperienceMode::VirtualTry => Scene::VirtualTryOn,
            ExperienceMode::Checkout => Scene::Checkout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Gallery => "gallery",
            Scene::ProductDetail => "product-detail",
            Scene::VirtualTryOn => "virtual-try-on",
            Scene::Cart => "cart",
            Scene::Checkout => "checkout",
        }
    }
}

/// Record of one render call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReceipt {
    pub scene: Scene,
    pub session_id: SessionId,
    pub product_id: Option<String>,
    /// Whether the product in focus supports AR/3D try-on
    pub ar_enabled: bool,
    pub rendered_at: DateTime<Utc>,
}

/// Rendering backend
pub trait ExperienceRenderer: Send + Sync {
    fn render(&self, scene: Scene, state: &ExperienceState, product: Option<&Product>) -> RenderReceipt;
}

/// Renderer that only emits structured log lines
#[derive(Debug, Default)]
pub struct TracingRenderer {
    rendered: AtomicU64,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of render calls served
    pub fn rendered(&self) -> u64 {
        self.rendered.load(Ordering::Relaxed)
    }
}

impl ExperienceRenderer for TracingRenderer {
    fn render(&self, scene: Scene, state: &ExperienceState, product: Option<&Product>) -> RenderReceipt {
        let ar_enabled = product.map(|p| p.virtual_try_on).unwrap_or(false);
        self.rendered.fetch_add(1, Ordering::Relaxed);

        info!(
            scene = scene.as_str(),
            session_id = %state.session_id,
            product_id = product.map(|p| p.id.as_str()),
            mode = ?state.experience_mode,
            cart_lines = state.cart_items.len(),
            ar_enabled,
            "Rendered scene"
        );

        RenderReceipt {
            scene,
            session_id: state.session_id.clone(),
            product_id: product.map(|p| p.id.clone()),
            ar_enabled,
            rendered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_catalog::{ProductCatalog, StaticCatalog};

    #[test]
    fn test_ar_follows_product_attribute() {
        let renderer = TracingRenderer::new();
        let catalog = StaticCatalog::demo();
        let state = ExperienceState::new(SessionId::from("s1"));

        for product in catalog.get_products(None) {
            let receipt = renderer.render(Scene::ProductDetail, &state, Some(&product));
            assert_eq!(receipt.ar_enabled, product.virtual_try_on);
            assert_eq!(receipt.product_id.as_deref(), Some(product.id.as_str()));
        }

        let receipt = renderer.render(Scene::Gallery, &state, None);
        assert!(!receipt.ar_enabled);
        assert_eq!(renderer.rendered(), catalog.len() as u64 + 1);
    }

    #[test]
    fn test_scene_for_mode() {
        assert_eq!(Scene::for_mode(ExperienceMode::Browse), Scene::Gallery);
        assert_eq!(Scene::for_mode(ExperienceMode::VirtualTry), Scene::VirtualTryOn);
    }
}
