//! Analytics Tracker
//!
//! Folds analytics events into per-session logs and global counters, and
//! computes session insights and system metrics on demand.

use std::sync::atomic::{AtomicU64, Ordering};

use atelier_common::SessionId;
use dashmap::{DashMap, DashSet};
use tracing::{debug, trace};

use crate::domain::analytics::{event_types, AnalyticsEvent};
use crate::domain::insights::{CategoryPopularity, ProductPopularity, SessionInsights, SystemMetrics};
use crate::POPULAR_PRODUCT_COUNT;

/// Behavioural analytics tracker
pub struct AnalyticsTracker {
    /// Per-session event logs, in tracking order
    events: DashMap<SessionId, Vec<AnalyticsEvent>>,
    /// Sessions that tracked at least one event and were not swept
    active_sessions: DashSet<SessionId>,
    /// Product id -> view count
    product_views: DashMap<String, u64>,
    /// Category -> view count
    category_views: DashMap<String, u64>,
    total_events: AtomicU64,
}

impl AnalyticsTracker {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
            active_sessions: DashSet::new(),
            product_views: DashMap::new(),
            category_views: DashMap::new(),
            total_events: AtomicU64::new(0),
        }
    }

    /// Track an event; never fails
    pub fn track(&self, event: AnalyticsEvent) {
        trace!(
            session_id = %event.session_id,
            event_type = %event.event_type,
            "Tracking analytics event"
        );

        self.total_events.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.insert(event.session_id.clone());

        if event.is_type(event_types::PRODUCT_VIEW) {
            if let Some(product_id) = event.product_id() {
                *self.product_views.entry(product_id.to_string()).or_insert(0) += 1;
            }
            if let Some(category) = event.category() {
                *self.category_views.entry(category.to_string()).or_insert(0) += 1;
            }
        }

        self.events
            .entry(event.session_id.clone())
            .or_default()
            .push(event);
    }

    /// Insights for one session; all zero when nothing was tracked
    pub fn get_insights(&self, session_id: &SessionId) -> SessionInsights {
        self.events
            .get(session_id)
            .map(|events| SessionInsights::from_events(&events))
            .unwrap_or_default()
    }

    /// System-wide metrics
    pub fn get_metrics(&self) -> SystemMetrics {
        let popular_products = top_counts(&self.product_views, POPULAR_PRODUCT_COUNT)
            .into_iter()
            .map(|(product_id, views)| ProductPopularity { product_id, views })
            .collect();

        let popular_categories = top_counts(&self.category_views, POPULAR_PRODUCT_COUNT)
            .into_iter()
            .map(|(category, views)| CategoryPopularity { category, views })
            .collect();

        let view_times: Vec<i64> = self
            .events
            .iter()
            .map(|entry| SessionInsights::span_ms(entry.value()))
            .filter(|ms| *ms > 0)
            .collect();

        let average_view_time_ms = if view_times.is_empty() {
            0.0
        } else {
            view_times.iter().sum::<i64>() as f64 / view_times.len() as f64
        };

        SystemMetrics {
            active_sessions: self.active_sessions.len(),
            total_events: self.total_events.load(Ordering::Relaxed),
            popular_products,
            popular_categories,
            average_view_time_ms,
        }
    }

    /// Drop per-session data for swept sessions; global counters are kept
    pub fn forget_sessions(&self, session_ids: &[SessionId]) {
        for id in session_ids {
            self.events.remove(id);
            self.active_sessions.remove(id);
        }
        if !session_ids.is_empty() {
            debug!(count = session_ids.len(), "Forgot analytics for dropped sessions");
        }
    }

    /// Copy of one session's tracked events
    pub fn session_events(&self, session_id: &SessionId) -> Vec<AnalyticsEvent> {
        self.events
            .get(session_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Default for AnalyticsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest counts first; equal counts ordered by key
fn top_counts(counts: &DashMap<String, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut ranked: Vec<(String, u64)> = counts
        .iter()
        .map(|entry| (entry.key().clone(), *entry.value()))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn view(session: &str, product: &str, category: &str) -> AnalyticsEvent {
        AnalyticsEvent::new(event_types::PRODUCT_VIEW, SessionId::from(session))
            .with_product(product, category)
    }

    #[test]
    fn test_unknown_session_insights_are_zero() {
        let tracker = AnalyticsTracker::new();
        let insights = tracker.get_insights(&SessionId::from("nobody"));

        assert_eq!(insights, SessionInsights::default());
        assert!(insights.preferred_categories.is_empty());
    }

    #[test]
    fn test_popular_products_across_sessions() {
        let tracker = AnalyticsTracker::new();
        for session in ["s1", "s2", "s3"] {
            tracker.track(view(session, "p1", "shoes"));
        }
        tracker.track(view("s1", "p2", "tops"));

        let metrics = tracker.get_metrics();
        assert_eq!(metrics.active_sessions, 3);
        assert_eq!(metrics.total_events, 4);
        assert_eq!(metrics.popular_products[0].product_id, "p1");
        assert_eq!(metrics.popular_products[0].views, 3);
        assert_eq!(metrics.popular_categories[0].category, "shoes");
    }

    #[test]
    fn test_only_product_views_are_counted() {
        let tracker = AnalyticsTracker::new();
        tracker.track(
            AnalyticsEvent::new(event_types::PRODUCT_LIKE, SessionId::from("s1"))
                .with_product("p1", "shoes"),
        );

        let metrics = tracker.get_metrics();
        assert_eq!(metrics.total_events, 1);
        assert!(metrics.popular_products.is_empty());
        assert!(metrics.popular_categories.is_empty());
    }

    #[test]
    fn test_ties_are_ordered_by_product_id() {
        let tracker = AnalyticsTracker::new();
        for product in ["p3", "p1", "p2"] {
            tracker.track(view("s1", product, "shoes"));
        }

        let ids: Vec<_> = tracker
            .get_metrics()
            .popular_products
            .into_iter()
            .map(|p| p.product_id)
            .collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_popular_products_are_capped() {
        let tracker = AnalyticsTracker::new();
        for i in 0..15 {
            tracker.track(view("s1", &format!("p{i:02}"), "tops"));
        }

        assert_eq!(tracker.get_metrics().popular_products.len(), POPULAR_PRODUCT_COUNT);
    }

    #[test]
    fn test_average_view_time_skips_single_event_sessions() {
        let tracker = AnalyticsTracker::new();
        let base: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        tracker.track(view("s1", "p1", "shoes").with_timestamp(base));
        tracker.track(view("s1", "p2", "shoes").with_timestamp(base + Duration::seconds(60)));
        tracker.track(view("s2", "p1", "shoes").with_timestamp(base));

        assert_eq!(tracker.get_metrics().average_view_time_ms, 60_000.0);
    }

    #[test]
    fn test_forget_sessions_keeps_global_counters() {
        let tracker = AnalyticsTracker::new();
        tracker.track(view("s1", "p1", "shoes"));
        tracker.track(view("s2", "p1", "shoes"));

        tracker.forget_sessions(&[SessionId::from("s1")]);

        let metrics = tracker.get_metrics();
        assert_eq!(metrics.active_sessions, 1);
        assert_eq!(metrics.total_events, 2);
        assert_eq!(metrics.popular_products[0].views, 2);
        assert!(tracker.session_events(&SessionId::from("s1")).is_empty());
        assert_eq!(tracker.session_events(&SessionId::from("s2")).len(), 1);
    }
}
