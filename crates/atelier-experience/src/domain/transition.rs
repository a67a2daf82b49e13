//! Event → state transition table
//!
//! | event        | effect                                               |
//! |--------------|------------------------------------------------------|
//! | view         | append product to viewed if absent                   |
//! | like         | append product to favorites if absent                |
//! | add-to-cart  | increment the product's cart line or insert qty 1    |
//! | try-virtual  | mode := virtual-try, current product cleared         |
//! | share        | none                                                 |
//!
//! Product-scoped transitions are skipped when the event carries no product.

use serde_json::{Map, Value};

use super::event::{EventKind, ExperienceEvent};
use super::state::{ExperienceMode, ExperienceState};

/// State change derived from one event
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    MarkViewed(String),
    AddFavorite(String),
    AddToCart {
        product_id: String,
        selected_options: Map<String, Value>,
    },
    EnterVirtualTry,
    Unchanged,
}

impl Transition {
    /// Look up the transition for an event
    pub fn for_event(event: &ExperienceEvent) -> Self {
        let product = event.product_id.clone();

        match (event.kind, product) {
            (EventKind::View, Some(id)) => Transition::MarkViewed(id),
            (EventKind::Like, Some(id)) => Transition::AddFavorite(id),
            (EventKind::AddToCart, Some(id)) => Transition::AddToCart {
                product_id: id,
                selected_options: event.selected_options(),
            },
            (EventKind::TryVirtual, _) => Transition::EnterVirtualTry,
            (EventKind::View | EventKind::Like | EventKind::AddToCart, None) => {
                Transition::Unchanged
            }
            (EventKind::Share, _) => Transition::Unchanged,
        }
    }

    /// Apply the transition; the state timestamp is refreshed either way
    pub fn apply(self, state: &mut ExperienceState) {
        match self {
            Transition::MarkViewed(id) => {
                state.mark_viewed(&id);
            }
            Transition::AddFavorite(id) => {
                state.add_favorite(&id);
            }
            Transition::AddToCart {
                product_id,
                selected_options,
            } => state.add_to_cart(&product_id, selected_options),
            Transition::EnterVirtualTry => {
                state.experience_mode = ExperienceMode::VirtualTry;
                state.current_product = None;
            }
            Transition::Unchanged => {}
        }
        state.touch();
    }
}
