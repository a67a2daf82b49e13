//! Derived personalization
//!
//! Computed on demand from a session's state and event log; never stored.

use serde::{Deserialize, Serialize};

use super::event::{EventKind, ExperienceEvent};
use super::ranking::top_by_frequency;
use super::state::ExperienceState;
use crate::{RECOMMENDED_FAVORITES, TOP_CATEGORY_COUNT};

/// Suggested when the session has favorites
pub const VIRTUAL_STYLING: &str = "virtual-styling";

/// Suggested when the cart is not empty
pub const COMPLETE_THE_LOOK: &str = "complete-the-look";

/// Suggested when more than [`PERSONALIZED_COLLECTION_MIN_VIEWS`] products were viewed
pub const PERSONALIZED_COLLECTION: &str = "personalized-collection";

pub const PERSONALIZED_COLLECTION_MIN_VIEWS: usize = 5;

/// Personalized suggestions for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedExperience {
    /// Most viewed categories, most frequent first
    pub preferred_categories: Vec<String>,
    /// First favorites, in insertion order
    pub recommended_products: Vec<String>,
    /// Experience tags unlocked by the session's activity
    pub suggested_experiences: Vec<String>,
}

impl PersonalizedExperience {
    /// Derive suggestions from state and event history
    pub fn derive(state: &ExperienceState, events: &[ExperienceEvent]) -> Self {
        let preferred_categories = top_by_frequency(
            events
                .iter()
                .filter(|e| e.kind == EventKind::View)
                .filter_map(ExperienceEvent::category),
            TOP_CATEGORY_COUNT,
        );

        let recommended_products = state
            .favorites
            .iter()
            .take(RECOMMENDED_FAVORITES)
            .cloned()
            .collect();

        let mut suggested_experiences = Vec::new();
        if !state.favorites.is_empty() {
            suggested_experiences.push(VIRTUAL_STYLING.to_string());
        }
        if !state.cart_items.is_empty() {
            suggested_experiences.push(COMPLETE_THE_LOOK.to_string());
        }
        if state.viewed_products.len() > PERSONALIZED_COLLECTION_MIN_VIEWS {
            suggested_experiences.push(PERSONALIZED_COLLECTION.to_string());
        }

        Self {
            preferred_categories,
            recommended_products,
            suggested_experiences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_common::SessionId;
    use serde_json::Map;

    #[test]
    fn test_empty_session() {
        let state = ExperienceState::new(SessionId::from("s1"));
        let p = PersonalizedExperience::derive(&state, &[]);
        assert_eq!(p, PersonalizedExperience::default());
    }

    #[test]
    fn test_categories_come_from_view_events_only() {
        let state = ExperienceState::new(SessionId::from("s1"));
        let events = vec![
            ExperienceEvent::view("a").with_category("tops"),
            ExperienceEvent::like("b").with_category("shoes"),
            ExperienceEvent::like("c").with_category("shoes"),
            ExperienceEvent::view("d").with_category("dresses"),
            ExperienceEvent::view("e").with_category("dresses"),
            ExperienceEvent::view("f").with_category("bags"),
            ExperienceEvent::view("g").with_category("coats"),
        ];

        let p = PersonalizedExperience::derive(&state, &events);
        assert_eq!(p.preferred_categories, vec!["dresses", "tops", "bags"]);
    }

    #[test]
    fn test_recommended_products_are_first_four_favorites() {
        let mut state = ExperienceState::new(SessionId::from("s1"));
        for id in ["f1", "f2", "f3", "f4", "f5"] {
            state.add_favorite(id);
        }

        let p = PersonalizedExperience::derive(&state, &[]);
        assert_eq!(p.recommended_products, vec!["f1", "f2", "f3", "f4"]);
        assert_eq!(p.suggested_experiences, vec![VIRTUAL_STYLING]);
    }

    #[test]
    fn test_suggestion_gates() {
        let mut state = ExperienceState::new(SessionId::from("s1"));
        state.add_to_cart("c1", Map::new());
        for i in 0..5 {
            state.mark_viewed(&format!("v{i}"));
        }

        let p = PersonalizedExperience::derive(&state, &[]);
        assert_eq!(p.suggested_experiences, vec![COMPLETE_THE_LOOK]);

        state.mark_viewed("v5");
        let p = PersonalizedExperience::derive(&state, &[]);
        assert_eq!(
            p.suggested_experiences,
            vec![COMPLETE_THE_LOOK, PERSONALIZED_COLLECTION]
        );
    }
}
