//! Experience events
//!
//! Immutable records of user actions. Every event is appended to the
//! session's log before its transition is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Metadata key carrying the product category
pub const CATEGORY_KEY: &str = "category";

/// Metadata key carrying the selected product options of a cart add
pub const OPTIONS_KEY: &str = "options";

/// Kind of user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    View,
    Like,
    AddToCart,
    TryVirtual,
    Share,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::View,
        EventKind::Like,
        EventKind::AddToCart,
        EventKind::TryVirtual,
        EventKind::Share,
    ];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Like => "like",
            EventKind::AddToCart => "add-to-cart",
            EventKind::TryVirtual => "try-virtual",
            EventKind::Share => "share",
        }
    }

    /// Parse a wire name; unrecognised names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEvent {
    /// Interaction kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Product the interaction refers to, if any
    #[serde(default)]
    pub product_id: Option<String>,

    /// When the interaction happened
    pub timestamp: DateTime<Utc>,

    /// Free-form metadata (e.g. `category`, `options`)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ExperienceEvent {
    /// Create an event of the given kind without a product
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            product_id: None,
            timestamp: Utc::now(),
            metadata: Map::new(),
        }
    }

    /// Create an event of the given kind for a product
    pub fn for_product(kind: EventKind, product_id: impl Into<String>) -> Self {
        Self {
            product_id: Some(product_id.into()),
            ..Self::new(kind)
        }
    }

    pub fn view(product_id: impl Into<String>) -> Self {
        Self::for_product(EventKind::View, product_id)
    }

    pub fn like(product_id: impl Into<String>) -> Self {
        Self::for_product(EventKind::Like, product_id)
    }

    pub fn add_to_cart(product_id: impl Into<String>) -> Self {
        Self::for_product(EventKind::AddToCart, product_id)
    }

    pub fn try_virtual(product_id: impl Into<String>) -> Self {
        Self::for_product(EventKind::TryVirtual, product_id)
    }

    pub fn share(product_id: impl Into<String>) -> Self {
        Self::for_product(EventKind::Share, product_id)
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach the product category
    pub fn with_category(self, category: impl Into<String>) -> Self {
        self.with_metadata(CATEGORY_KEY, Value::String(category.into()))
    }

    /// Override the event time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Category carried in the metadata, if it is a string
    pub fn category(&self) -> Option<&str> {
        self.metadata.get(CATEGORY_KEY).and_then(Value::as_str)
    }

    /// Selected options carried in the metadata, empty unless an object
    pub fn selected_options(&self) -> Map<String, Value> {
        match self.metadata.get(OPTIONS_KEY) {
            Some(Value::Object(options)) => options.clone(),
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_wire_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
        assert_eq!(EventKind::parse("wishlist"), None);
    }

    #[test]
    fn test_category_and_options() {
        let event = ExperienceEvent::add_to_cart("p1")
            .with_category("shoes")
            .with_metadata(OPTIONS_KEY, json!({"size": "38"}));

        assert_eq!(event.category(), Some("shoes"));
        assert_eq!(event.selected_options().get("size"), Some(&json!("38")));

        let bare = ExperienceEvent::view("p1").with_metadata(OPTIONS_KEY, json!("not-an-object"));
        assert!(bare.selected_options().is_empty());
        assert_eq!(bare.category(), None);
    }

    #[test]
    fn test_deserializes_wire_shape() {
        let event: ExperienceEvent = serde_json::from_value(json!({
            "type": "add-to-cart",
            "productId": "p7",
            "timestamp": "2026-01-01T10:00:00Z",
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::AddToCart);
        assert_eq!(event.product_id.as_deref(), Some("p7"));
        assert!(event.metadata.is_empty());
    }
}
