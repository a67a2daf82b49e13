//! Behavioural insights and system metrics
//!
//! Heuristic scoring over tracked analytics events. This is a pluggable
//! scoring boundary, not a predictive model.

use serde::{Deserialize, Serialize};

use super::analytics::{event_types, AnalyticsEvent};
use super::ranking::top_by_frequency;
use crate::TOP_CATEGORY_COUNT;

/// Weight of each behaviour flag in the conversion likelihood
pub const CONVERSION_WEIGHTS: [(&str, f64); 5] = [
    (event_types::PRODUCT_VIEW, 0.1),
    (event_types::PRODUCT_DETAIL_VIEW, 0.2),
    (event_types::PRODUCT_LIKE, 0.3),
    (event_types::VIRTUAL_TRY_ON, 0.25),
    (event_types::ADD_TO_CART, 0.4),
];

/// View time that earns the full time bonus
const TIME_BONUS_WINDOW_MS: f64 = 5.0 * 60_000.0;
const MAX_TIME_BONUS: f64 = 0.2;

const RATE_BONUS_PER_EVENT_PER_MINUTE: f64 = 0.05;
const MAX_RATE_BONUS: f64 = 0.15;

/// Behavioural insights for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInsights {
    /// Milliseconds between first and last tracked event
    pub view_time_ms: i64,
    /// Events whose type is an interaction type
    pub interaction_count: usize,
    /// Most frequent categories, most frequent first
    pub preferred_categories: Vec<String>,
    /// Heuristic score in [0, 1]
    pub conversion_likelihood: f64,
}

impl SessionInsights {
    /// Compute insights from a session's events (in tracking order)
    pub fn from_events(events: &[AnalyticsEvent]) -> Self {
        if events.is_empty() {
            return Self::default();
        }

        let view_time_ms = Self::span_ms(events);
        let interaction_count = events.iter().filter(|e| e.is_interaction()).count();
        let preferred_categories = top_by_frequency(
            events.iter().filter_map(AnalyticsEvent::category),
            TOP_CATEGORY_COUNT,
        );
        let conversion_likelihood = Self::conversion_likelihood(events, view_time_ms);

        Self {
            view_time_ms,
            interaction_count,
            preferred_categories,
            conversion_likelihood,
        }
    }

    /// Milliseconds between the first and last event, 0 with fewer than two
    pub fn span_ms(events: &[AnalyticsEvent]) -> i64 {
        match (events.first(), events.last()) {
            (Some(first), Some(last)) if events.len() >= 2 => {
                (last.timestamp - first.timestamp).num_milliseconds().max(0)
            }
            _ => 0,
        }
    }

    fn conversion_likelihood(events: &[AnalyticsEvent], view_time_ms: i64) -> f64 {
        let behaviour: f64 = CONVERSION_WEIGHTS
            .iter()
            .filter(|(event_type, _)| events.iter().any(|e| e.is_type(event_type)))
            .map(|(_, weight)| weight)
            .sum();

        let view_time = view_time_ms as f64;
        let time_bonus = (view_time / TIME_BONUS_WINDOW_MS).min(MAX_TIME_BONUS);

        let events_per_minute = if view_time_ms > 0 {
            events.len() as f64 / (view_time / 60_000.0)
        } else {
            0.0
        };
        let rate_bonus = (events_per_minute * RATE_BONUS_PER_EVENT_PER_MINUTE).min(MAX_RATE_BONUS);

        (behaviour + time_bonus + rate_bonus).min(1.0)
    }
}

/// View count of one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPopularity {
    pub product_id: String,
    pub views: u64,
}

/// View count of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPopularity {
    pub category: String,
    pub views: u64,
}

/// System-wide metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub active_sessions: usize,
    pub total_events: u64,
    /// Most viewed products, highest count first
    pub popular_products: Vec<ProductPopularity>,
    /// Most viewed categories, highest count first
    pub popular_categories: Vec<CategoryPopularity>,
    /// Mean view time over sessions with a non-zero view time
    pub average_view_time_ms: f64,
}
