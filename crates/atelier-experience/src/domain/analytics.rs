//! Analytics events
//!
//! Looser than experience events: the type is a free-form string and the
//! payload an arbitrary JSON object.

use atelier_common::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known analytics event types
pub mod event_types {
    pub const PRODUCT_VIEW: &str = "product_view";
    pub const PRODUCT_DETAIL_VIEW: &str = "product_detail_view";
    pub const PRODUCT_LIKE: &str = "product_like";
    pub const VIRTUAL_TRY_ON: &str = "virtual_try_on";
    pub const ADD_TO_CART: &str = "add_to_cart";
    pub const PRODUCT_SHARE: &str = "product_share";
    pub const SESSION_START: &str = "session_start";
    pub const CHECKOUT_START: &str = "checkout_start";
    pub const CATALOG_SEARCH: &str = "catalog_search";

    /// Types counted as interactions by session insights
    pub const INTERACTIONS: [&str; 6] = [
        PRODUCT_VIEW,
        PRODUCT_DETAIL_VIEW,
        PRODUCT_LIKE,
        VIRTUAL_TRY_ON,
        ADD_TO_CART,
        PRODUCT_SHARE,
    ];
}

/// Data key carrying the product id
pub const PRODUCT_ID_KEY: &str = "productId";

/// Data key carrying the product category
pub const CATEGORY_KEY: &str = "category";

/// A tracked analytics event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl AnalyticsEvent {
    pub fn new(event_type: impl Into<String>, session_id: SessionId) -> Self {
        Self {
            event_type: event_type.into(),
            session_id,
            timestamp: Utc::now(),
            data: Map::new(),
        }
    }

    /// Attach a data entry
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Attach product id and category
    pub fn with_product(self, product_id: impl Into<String>, category: impl Into<String>) -> Self {
        self.with_data(PRODUCT_ID_KEY, Value::String(product_id.into()))
            .with_data(CATEGORY_KEY, Value::String(category.into()))
    }

    /// Override the event time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn product_id(&self) -> Option<&str> {
        self.data.get(PRODUCT_ID_KEY).and_then(Value::as_str)
    }

    pub fn category(&self) -> Option<&str> {
        self.data.get(CATEGORY_KEY).and_then(Value::as_str)
    }

    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    pub fn is_interaction(&self) -> bool {
        event_types::INTERACTIONS.contains(&self.event_type.as_str())
    }
}
