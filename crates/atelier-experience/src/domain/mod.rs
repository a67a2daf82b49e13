//! Experience domain logic
//!
//! Session state, events, the transition table and the derived read models.

pub mod analytics;
pub mod event;
pub mod insights;
pub mod personalization;
pub mod ranking;
pub mod state;
pub mod transition;
