//! Per-session shopping state
//!
//! `viewed_products` and `favorites` hold unique ids in insertion order and
//! `cart_items` holds at most one line per product. Nothing in this module
//! removes an id from the viewed or favorite lists.

use atelier_common::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// High-level UI context of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceMode {
    #[default]
    Browse,
    Detailed,
    VirtualTry,
    Checkout,
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub selected_options: Map<String, Value>,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, selected_options: Map<String, Value>) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: 1,
            selected_options,
            added_at: Utc::now(),
        }
    }
}

/// Read model of a session's shopping state (the event log is kept apart)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceState {
    pub session_id: SessionId,
    pub current_product: Option<String>,
    pub viewed_products: Vec<String>,
    pub favorites: Vec<String>,
    pub cart_items: Vec<CartItem>,
    pub experience_mode: ExperienceMode,
    /// Last mutation time
    pub timestamp: DateTime<Utc>,
}

impl ExperienceState {
    /// Empty state in browse mode
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            current_product: None,
            viewed_products: Vec::new(),
            favorites: Vec::new(),
            cart_items: Vec::new(),
            experience_mode: ExperienceMode::Browse,
            timestamp: Utc::now(),
        }
    }

    /// Record a product view; returns false when already viewed
    pub fn mark_viewed(&mut self, product_id: &str) -> bool {
        push_unique(&mut self.viewed_products, product_id)
    }

    /// Add a favorite; returns false when already a favorite
    pub fn add_favorite(&mut self, product_id: &str) -> bool {
        push_unique(&mut self.favorites, product_id)
    }

    /// Add one unit of a product to the cart, merging with an existing line
    pub fn add_to_cart(&mut self, product_id: &str, selected_options: Map<String, Value>) {
        match self
            .cart_items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self
                .cart_items
                .push(CartItem::new(product_id, selected_options)),
        }
    }

    /// Quantity of a product in the cart (0 when absent)
    pub fn cart_quantity(&self, product_id: &str) -> u32 {
        self.cart_items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .unwrap_or(0)
    }

    /// Total units in the cart
    pub fn cart_units(&self) -> u32 {
        self.cart_items
            .iter()
            .fold(0u32, |units, item| units.saturating_add(item.quantity))
    }

    /// Merge a partial update.
    ///
    /// Sequence fields are replaced wholesale, then normalised so the
    /// uniqueness invariants still hold. The timestamp is always refreshed.
    pub fn apply_update(&mut self, update: StateUpdate) {
        if let Some(current) = update.current_product {
            self.current_product = current;
        }
        if let Some(viewed) = update.viewed_products {
            self.viewed_products = dedup_preserving_order(viewed);
        }
        if let Some(favorites) = update.favorites {
            self.favorites = dedup_preserving_order(favorites);
        }
        if let Some(cart) = update.cart_items {
            self.cart_items = merge_cart_lines(cart);
        }
        if let Some(mode) = update.experience_mode {
            self.experience_mode = mode;
        }
        self.touch();
    }

    /// Refresh the mutation timestamp
    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }
}

/// Partial state update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    /// `Some(None)` clears the current product
    pub current_product: Option<Option<String>>,
    pub viewed_products: Option<Vec<String>>,
    pub favorites: Option<Vec<String>>,
    pub cart_items: Option<Vec<CartItem>>,
    pub experience_mode: Option<ExperienceMode>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_product(mut self, product_id: impl Into<String>) -> Self {
        self.current_product = Some(Some(product_id.into()));
        self
    }

    pub fn clear_current_product(mut self) -> Self {
        self.current_product = Some(None);
        self
    }

    pub fn viewed_products(mut self, ids: Vec<String>) -> Self {
        self.viewed_products = Some(ids);
        self
    }

    pub fn favorites(mut self, ids: Vec<String>) -> Self {
        self.favorites = Some(ids);
        self
    }

    pub fn cart_items(mut self, items: Vec<CartItem>) -> Self {
        self.cart_items = Some(items);
        self
    }

    pub fn mode(mut self, mode: ExperienceMode) -> Self {
        self.experience_mode = Some(mode);
        self
    }
}

fn push_unique(list: &mut Vec<String>, id: &str) -> bool {
    if list.iter().any(|existing| existing == id) {
        return false;
    }
    list.push(id.to_string());
    true
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// Duplicate lines collapse into the first one, summing quantities.
fn merge_cart_lines(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ExperienceState {
        ExperienceState::new(SessionId::from("s1"))
    }

    #[test]
    fn test_new_state_is_empty_browse() {
        let s = state();
        assert_eq!(s.experience_mode, ExperienceMode::Browse);
        assert!(s.viewed_products.is_empty());
        assert!(s.favorites.is_empty());
        assert!(s.cart_items.is_empty());
        assert!(s.current_product.is_none());
    }

    #[test]
    fn test_viewed_and_favorites_are_unique() {
        let mut s = state();
        assert!(s.mark_viewed("p1"));
        assert!(s.mark_viewed("p2"));
        assert!(!s.mark_viewed("p1"));
        assert_eq!(s.viewed_products, vec!["p1", "p2"]);

        assert!(s.add_favorite("p2"));
        assert!(!s.add_favorite("p2"));
        assert_eq!(s.favorites, vec!["p2"]);
    }

    #[test]
    fn test_cart_merges_by_product() {
        let mut s = state();
        s.add_to_cart("p1", Map::new());
        s.add_to_cart("p2", Map::new());
        s.add_to_cart("p1", Map::new());

        assert_eq!(s.cart_items.len(), 2);
        assert_eq!(s.cart_quantity("p1"), 2);
        assert_eq!(s.cart_quantity("p3"), 0);
        assert_eq!(s.cart_units(), 3);
    }

    #[test]
    fn test_update_replaces_sequences_and_keeps_invariants() {
        let mut s = state();
        s.mark_viewed("p1");
        let before = s.timestamp;

        s.apply_update(
            StateUpdate::new()
                .viewed_products(vec!["p3".into(), "p4".into(), "p3".into()])
                .cart_items(vec![CartItem::new("p9", Map::new()), CartItem::new("p9", Map::new())])
                .mode(ExperienceMode::Checkout),
        );

        assert_eq!(s.viewed_products, vec!["p3", "p4"]);
        assert_eq!(s.cart_items.len(), 1);
        assert_eq!(s.cart_quantity("p9"), 2);
        assert_eq!(s.experience_mode, ExperienceMode::Checkout);
        assert!(s.timestamp >= before);
    }

    #[test]
    fn test_cart_quantities_saturate() {
        let mut huge = CartItem::new("p1", Map::new());
        huge.quantity = u32::MAX;

        let mut s = state();
        s.apply_update(StateUpdate::new().cart_items(vec![
            huge,
            CartItem::new("p1", Map::new()),
            CartItem::new("p2", Map::new()),
        ]));

        assert_eq!(s.cart_items.len(), 2);
        assert_eq!(s.cart_quantity("p1"), u32::MAX);
        assert_eq!(s.cart_units(), u32::MAX);

        s.add_to_cart("p1", Map::new());
        assert_eq!(s.cart_quantity("p1"), u32::MAX);
    }

    #[test]
    fn test_update_current_product() {
        let mut s = state();
        s.apply_update(StateUpdate::new().current_product("p1"));
        assert_eq!(s.current_product.as_deref(), Some("p1"));

        // Untouched by an unrelated update
        s.apply_update(StateUpdate::new().mode(ExperienceMode::Detailed));
        assert_eq!(s.current_product.as_deref(), Some("p1"));

        s.apply_update(StateUpdate::new().clear_current_product());
        assert!(s.current_product.is_none());
    }

    #[test]
    fn test_mode_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(ExperienceMode::VirtualTry).unwrap(),
            serde_json::json!("virtual-try")
        );
    }
}
